use super::{opt_file, opt_text, FieldReader, FormBody, FormValue, RawForm, ValidationErrors};
use crate::models::HospitalBody;

impl FormBody for HospitalBody {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "address",
        "phone",
        "email",
        "latitude",
        "longitude",
        "description",
        "logo",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let name = r.required_text("name");
        let address = r.required_text("address");
        let phone = r.optional_text("phone");
        let email = r.optional_email("email");
        let latitude = r.number_in("latitude", -90.0, 90.0);
        let longitude = r.number_in("longitude", -180.0, 180.0);
        let description = r.optional_text("description");
        let logo = r.optional_file("logo");

        r.finish(|| {
            Some(HospitalBody {
                name: name?,
                address: address?,
                phone,
                email,
                latitude: latitude?,
                longitude: longitude?,
                description,
                logo,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("name", self.name.as_str())
            .with("address", self.address.as_str())
            .with("phone", opt_text(&self.phone))
            .with(
                "email",
                self.email
                    .as_ref()
                    .map_or(FormValue::Null, |e| e.as_str().into()),
            )
            .with("latitude", self.latitude)
            .with("longitude", self.longitude)
            .with("description", opt_text(&self.description))
            .with("logo", opt_file(&self.logo))
    }
}
