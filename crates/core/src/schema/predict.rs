use super::{FieldReader, FormBody, RawForm, ValidationErrors};
use crate::attachment::Attachment;
use crate::constants::{DEFAULT_TOP_K, MAX_TOP_K};

/// Retinal image upload plus the number of ranked labels wanted back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredictForm {
    pub image: Attachment,
    pub top_k: u32,
}

impl FormBody for PredictForm {
    const FIELDS: &'static [&'static str] = &["image", "top_k"];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let image = r.required_file("image");
        if let Some(file) = &image {
            if !file.is_image() {
                r.fail(
                    "image",
                    format!("must be an image, got `{}`", file.media_type()),
                );
            }
        }
        let top_k = r.integer_or("top_k", i64::from(DEFAULT_TOP_K), 1);
        if let Some(k) = top_k {
            if k > i64::from(MAX_TOP_K) {
                r.fail("top_k", format!("must be at most {MAX_TOP_K}"));
            }
        }

        r.finish(|| {
            Some(PredictForm {
                image: image?,
                top_k: u32::try_from(top_k?).ok()?,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("image", self.image.clone())
            .with("top_k", i64::from(self.top_k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_top_k_defaults_to_three() {
        let raw = RawForm::new().with("image", Attachment::from_bytes("eye.png", PNG));
        let form = PredictForm::from_form(&raw).unwrap();
        assert_eq!(form.top_k, 3);
        assert_eq!(PredictForm::from_form(&form.to_form()).unwrap(), form);
    }

    #[test]
    fn test_top_k_bounds() {
        let image = Attachment::from_bytes("eye.png", PNG);
        for bad in ["0", "11"] {
            let raw = RawForm::new().with("image", image.clone()).with("top_k", bad);
            assert!(PredictForm::from_form(&raw).unwrap_err().has_field("top_k"));
        }
        let raw = RawForm::new().with("image", image).with("top_k", "10");
        assert_eq!(PredictForm::from_form(&raw).unwrap().top_k, 10);
    }

    #[test]
    fn test_non_image_is_rejected() {
        let raw = RawForm::new().with("image", Attachment::from_bytes("notes.txt", &b"hello"[..]));
        let err = PredictForm::from_form(&raw).unwrap_err();
        assert!(err.for_field("image").unwrap().message.starts_with("must be an image"));
    }

    #[test]
    fn test_image_is_required() {
        let err = PredictForm::from_form(&RawForm::new()).unwrap_err();
        assert_eq!(err.for_field("image").unwrap().message, "is required");
    }
}
