use bytes::Bytes;

/// A single image part from a multipart body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub body: Bytes,
}

/// Fields collected from a multipart product body. Used both for create
/// (after required-field validation) and for patch-style update, where
/// `None` means "omitted, keep the current value".
#[derive(Debug, Default)]
pub struct ProductForm {
    pub name: Option<String>,
    pub category: Option<String>,
    pub model: Option<String>,
    pub inventory_number: Option<String>,
    pub serial_number: Option<String>,
    pub guarantee: Option<String>,
    pub price: Option<String>,
    pub status: Option<String>,
    pub belong_to: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
    pub image: Option<ImageUpload>,
}

/// The mandatory creation fields, proven present.
#[derive(Debug)]
pub struct NewProductFields {
    pub name: String,
    pub category: String,
    pub model: String,
    pub inventory_number: String,
    pub serial_number: Option<String>,
    pub guarantee: Option<String>,
    pub price: String,
    pub status: String,
    pub belong_to: Option<String>,
    pub description: Option<String>,
    pub comment: Option<String>,
}

impl ProductForm {
    /// Wire names of required fields that are absent or empty.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        let required = [
            ("name", &self.name),
            ("category", &self.category),
            ("inventorynumber", &self.inventory_number),
            ("price", &self.price),
            ("statusDevice", &self.status),
            ("model", &self.model),
        ];
        for (wire_name, value) in required {
            if value.as_deref().map_or(true, str::is_empty) {
                missing.push(wire_name);
            }
        }
        missing
    }

    /// Split into validated creation fields plus the optional image, or the
    /// list of missing required fields.
    pub fn into_validated(self) -> Result<(NewProductFields, Option<ImageUpload>), Vec<&'static str>> {
        let missing = self.missing_required();
        if !missing.is_empty() {
            return Err(missing);
        }

        let ProductForm {
            name,
            category,
            model,
            inventory_number,
            serial_number,
            guarantee,
            price,
            status,
            belong_to,
            description,
            comment,
            image,
        } = self;

        let (Some(name), Some(category), Some(model), Some(inventory_number), Some(price), Some(status)) =
            (name, category, model, inventory_number, price, status)
        else {
            // missing_required() above guarantees these are present
            return Err(vec![]);
        };

        Ok((
            NewProductFields {
                name,
                category,
                model,
                inventory_number,
                serial_number,
                guarantee,
                price,
                status,
                belong_to,
                description,
                comment,
            },
            image,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> ProductForm {
        ProductForm {
            name: Some("ThinkPad X1".into()),
            category: Some("laptop".into()),
            model: Some("X1 Carbon Gen 9".into()),
            inventory_number: Some("INV-0042".into()),
            price: Some("1200".into()),
            status: Some("in use".into()),
            ..Default::default()
        }
    }

    #[test]
    fn complete_form_validates() {
        let (fields, image) = complete_form().into_validated().expect("valid");
        assert_eq!(fields.name, "ThinkPad X1");
        assert_eq!(fields.inventory_number, "INV-0042");
        assert!(fields.serial_number.is_none());
        assert!(image.is_none());
    }

    #[test]
    fn missing_price_is_listed() {
        let mut form = complete_form();
        form.price = None;
        let missing = form.into_validated().unwrap_err();
        assert_eq!(missing, vec!["price"]);
    }

    #[test]
    fn empty_string_counts_as_missing() {
        let mut form = complete_form();
        form.status = Some(String::new());
        assert_eq!(form.missing_required(), vec!["statusDevice"]);
    }

    #[test]
    fn all_missing_fields_are_listed_in_order() {
        let form = ProductForm::default();
        assert_eq!(
            form.missing_required(),
            vec!["name", "category", "inventorynumber", "price", "statusDevice", "model"]
        );
    }

    #[test]
    fn optional_fields_do_not_block_validation() {
        let mut form = complete_form();
        form.serial_number = None;
        form.guarantee = None;
        form.comment = None;
        assert!(form.into_validated().is_ok());
    }
}
