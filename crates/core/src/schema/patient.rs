use super::{opt_file, opt_text, FieldReader, FormBody, FormValue, RawForm, ValidationErrors};
use crate::models::{Gender, PatientBody, WireEnum};

impl FormBody for PatientBody {
    const FIELDS: &'static [&'static str] = &[
        "user_id",
        "full_name",
        "date_of_birth",
        "gender",
        "phone",
        "address",
        "avatar",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let user_id = r.required_id("user_id");
        let full_name = r.required_text("full_name");
        let date_of_birth = r.optional_date("date_of_birth");
        let gender = r.required_enum::<Gender>("gender");
        let phone = r.optional_text("phone");
        let address = r.optional_text("address");
        let avatar = r.optional_file("avatar");

        r.finish(|| {
            Some(PatientBody {
                user_id: user_id?,
                full_name: full_name?,
                date_of_birth,
                gender: gender?,
                phone,
                address,
                avatar,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("user_id", self.user_id)
            .with("full_name", self.full_name.as_str())
            .with(
                "date_of_birth",
                self.date_of_birth
                    .map_or(FormValue::Null, |d| d.format("%Y-%m-%d").to_string().into()),
            )
            .with("gender", self.gender.as_wire())
            .with("phone", opt_text(&self.phone))
            .with("address", opt_text(&self.address))
            .with("avatar", opt_file(&self.avatar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_date_of_birth_format() {
        let raw = RawForm::new()
            .with("user_id", "7")
            .with("full_name", "Le Van A")
            .with("gender", "male")
            .with("date_of_birth", "03/04/1990");
        let err = PatientBody::from_form(&raw).unwrap_err();
        assert!(err.has_field("date_of_birth"));
        assert!(err.has_field("gender"));
    }

    #[test]
    fn test_round_trip() {
        let raw = RawForm::new()
            .with("user_id", 7i64)
            .with("full_name", "Le Van A")
            .with("gender", "MALE")
            .with("date_of_birth", "1990-04-03");
        let body = PatientBody::from_form(&raw).unwrap();
        assert_eq!(body.date_of_birth, NaiveDate::from_ymd_opt(1990, 4, 3));
        assert_eq!(PatientBody::from_form(&body.to_form()).unwrap(), body);
    }
}
