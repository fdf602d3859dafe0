use super::{opt_file, opt_text, FieldReader, FormBody, RawForm, ValidationErrors};
use crate::models::{DrugBody, DrugCategory, WireEnum};

impl FormBody for DrugBody {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "description",
        "price",
        "stock_quantity",
        "unit",
        "manufacturer",
        "category",
        "image",
    ];

    fn from_form(form: &RawForm) -> Result<Self, ValidationErrors> {
        let mut r = FieldReader::new(form, Self::FIELDS);
        let name = r.required_text("name");
        let description = r.optional_text("description");
        let price = r.non_negative("price");
        let stock_quantity = r.integer_or("stock_quantity", 0, 0);
        let unit = r.required_text("unit");
        let manufacturer = r.optional_text("manufacturer");
        let category = r.required_enum::<DrugCategory>("category");
        let image = r.optional_file("image");

        r.finish(|| {
            Some(DrugBody {
                name: name?,
                description,
                price: price?,
                stock_quantity: stock_quantity?,
                unit: unit?,
                manufacturer,
                category: category?,
                image,
            })
        })
    }

    fn to_form(&self) -> RawForm {
        RawForm::new()
            .with("name", self.name.as_str())
            .with("description", opt_text(&self.description))
            .with("price", self.price)
            .with("stock_quantity", self.stock_quantity)
            .with("unit", self.unit.as_str())
            .with("manufacturer", opt_text(&self.manufacturer))
            .with("category", self.category.as_wire())
            .with("image", opt_file(&self.image))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attachment::Attachment;

    fn form() -> RawForm {
        RawForm::new()
            .with("name", "Atropine 0.01%")
            .with("price", "120000")
            .with("unit", "bottle")
            .with("category", "EYE_DROPS")
    }

    #[test]
    fn test_defaults_and_coercion() {
        let body = DrugBody::from_form(&form()).unwrap();
        assert_eq!(body.price, 120000.0);
        assert_eq!(body.stock_quantity, 0);
        assert_eq!(body.category, DrugCategory::EyeDrops);
        assert!(body.image.is_none());
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let err = DrugBody::from_form(&form().with("price", -1.0)).unwrap_err();
        assert_eq!(err.for_field("price").unwrap().message, "must be at least 0");
    }

    #[test]
    fn test_every_violation_is_reported() {
        let raw = RawForm::new()
            .with("name", "   ")
            .with("price", "cheap")
            .with("stock_quantity", "2.5")
            .with("category", "POTION");
        let err = DrugBody::from_form(&raw).unwrap_err();
        for field in ["name", "price", "stock_quantity", "unit", "category"] {
            assert!(err.has_field(field), "missing error for {field}");
        }
    }

    #[test]
    fn test_round_trip_with_image() {
        let body = DrugBody::from_form(
            &form()
                .with("stock_quantity", 40i64)
                .with("manufacturer", "Santen")
                .with("image", Attachment::new("bottle.png", "image/png", vec![1u8, 2, 3])),
        )
        .unwrap();
        assert_eq!(DrugBody::from_form(&body.to_form()).unwrap(), body);
    }
}
