use super::{opt_file, opt_text, FieldReader, FormBody, RawForm, ValidationErrors};
use crate::models::LecturerBody;

impl FormBody for LecturerBody {
    const FIELDS: &'static [&'static str] = &[
        "full_name",
        "email",
        "phone",
        "specialization",
        "academic_title",
        "bio",
        "avatar",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let full_name = r.required_text("full_name");
        let email = r.required_email("email");
        let phone = r.optional_text("phone");
        let specialization = r.required_text("specialization");
        let academic_title = r.optional_text("academic_title");
        let bio = r.optional_text("bio");
        let avatar = r.optional_file("avatar");

        r.finish(|| {
            Some(LecturerBody {
                full_name: full_name?,
                email: email?,
                phone,
                specialization: specialization?,
                academic_title,
                bio,
                avatar,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("full_name", self.full_name.as_str())
            .with("email", self.email.as_str())
            .with("phone", opt_text(&self.phone))
            .with("specialization", self.specialization.as_str())
            .with("academic_title", opt_text(&self.academic_title))
            .with("bio", opt_text(&self.bio))
            .with("avatar", opt_file(&self.avatar))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_required() {
        let raw = RawForm::new()
            .with("full_name", "Dr. Tran")
            .with("specialization", "Glaucoma");
        let err = LecturerBody::from_form(&raw).unwrap_err();
        assert_eq!(err.for_field("email").unwrap().message, "is required");
    }

    #[test]
    fn test_round_trip() {
        let raw = RawForm::new()
            .with("full_name", " Dr. Tran ")
            .with("email", "tran@uni.edu")
            .with("specialization", "Glaucoma")
            .with("academic_title", "Assoc. Prof.");
        let body = LecturerBody::from_form(&raw).unwrap();
        assert_eq!(body.full_name.as_str(), "Dr. Tran");
        assert_eq!(LecturerBody::from_form(&body.to_form()).unwrap(), body);
    }
}
