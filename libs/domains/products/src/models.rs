use axum_helpers::JsonField;
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::error::{ProductError, ProductResult};

/// Product status
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    Default,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductStatus {
    /// Product is available
    #[default]
    Active,
    /// Product is disabled
    Inactive,
}

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned at creation
    pub id: Uuid,
    pub name: String,
    /// Units in stock
    pub quantity: i32,
    pub price: f64,
    pub status: ProductStatus,
    /// Set once at creation
    pub created_at: DateTime<Utc>,
    /// Refreshed by every successful update
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(range(min = 0))]
    pub quantity: i32,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[serde(default)]
    pub status: ProductStatus,
}

/// DTO for patching an existing product
///
/// Absent and `null` fields are left unchanged. `id` and the timestamps
/// are not part of the patch; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    pub status: Option<ProductStatus>,
}

/// Create body as received over HTTP
///
/// Fields are decoded one by one, so `validate` reports every missing,
/// mistyped or out-of-range field together. Convert with
/// `CreateProduct::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub name: JsonField<String>,
    #[serde(default)]
    pub quantity: JsonField<i32>,
    #[serde(default)]
    pub price: JsonField<f64>,
    #[serde(default)]
    pub status: JsonField<ProductStatus>,
}

/// Patch body as received over HTTP; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProductRequest {
    #[serde(default)]
    pub name: JsonField<String>,
    #[serde(default)]
    pub quantity: JsonField<i32>,
    #[serde(default)]
    pub price: JsonField<f64>,
    #[serde(default)]
    pub status: JsonField<ProductStatus>,
}

/// Query filters for listing products
///
/// Both bounds are inclusive and optional. `min_price > max_price` matches nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    /// Lowest price to include
    pub min_price: Option<f64>,
    /// Highest price to include
    pub max_price: Option<f64>,
}

impl Product {
    /// Create a new product from CreateProduct DTO
    ///
    /// Timestamps are truncated to milliseconds, the precision MongoDB stores.
    pub fn new(input: CreateProduct) -> Self {
        let now = now_millis();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            quantity: input.quantity,
            price: input.price,
            status: input.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch and refresh `updated_at`
    pub fn apply_update(&mut self, update: UpdateProduct) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = now_millis();
    }
}

impl UpdateProduct {
    /// True when the patch changes no field
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.price.is_none()
            && self.status.is_none()
    }
}

impl CreateProductRequest {
    /// Present fields as a patch; create and patch share the value rules
    fn present_fields(&self) -> UpdateProduct {
        UpdateProduct {
            name: self.name.value().cloned(),
            quantity: self.quantity.value().copied(),
            price: self.price.value().copied(),
            status: self.status.value().copied(),
        }
    }
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.present_fields().validate().err().unwrap_or_default();

        self.name.check_required("name", &mut errors);
        self.quantity.check_required("quantity", &mut errors);
        self.price.check_required("price", &mut errors);
        self.status.check_type("status", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl TryFrom<CreateProductRequest> for CreateProduct {
    type Error = ValidationErrors;

    fn try_from(request: CreateProductRequest) -> Result<Self, Self::Error> {
        request.validate()?;

        let status = request.status.into_option().unwrap_or_default();
        match (
            request.name.into_option(),
            request.quantity.into_option(),
            request.price.into_option(),
        ) {
            (Some(name), Some(quantity), Some(price)) => Ok(CreateProduct {
                name,
                quantity,
                price,
                status,
            }),
            // validate() has already reported any absent field
            _ => Err(ValidationErrors::new()),
        }
    }
}

impl UpdateProductRequest {
    fn present_fields(&self) -> UpdateProduct {
        UpdateProduct {
            name: self.name.value().cloned(),
            quantity: self.quantity.value().copied(),
            price: self.price.value().copied(),
            status: self.status.value().copied(),
        }
    }
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = self.present_fields().validate().err().unwrap_or_default();

        self.name.check_type("name", &mut errors);
        self.quantity.check_type("quantity", &mut errors);
        self.price.check_type("price", &mut errors);
        self.status.check_type("status", &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl TryFrom<UpdateProductRequest> for UpdateProduct {
    type Error = ValidationErrors;

    fn try_from(request: UpdateProductRequest) -> Result<Self, Self::Error> {
        request.validate()?;
        Ok(request.present_fields())
    }
}

impl ProductFilter {
    pub fn new(min_price: Option<f64>, max_price: Option<f64>) -> Self {
        Self {
            min_price,
            max_price,
        }
    }

    /// Both bounds, when given, must be finite (`NaN` and `inf` parse as `f64`)
    pub fn check_bounds(&self) -> ProductResult<()> {
        for (name, bound) in [("min_price", self.min_price), ("max_price", self.max_price)] {
            if let Some(value) = bound.filter(|v| !v.is_finite()) {
                return Err(ProductError::InvalidFilter(format!(
                    "{name} must be a finite number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Whether `price` lies within the inclusive bounds
    pub fn matches(&self, price: f64) -> bool {
        self.min_price.is_none_or(|min| price >= min) && self.max_price.is_none_or(|max| price <= max)
    }
}

/// Current time at millisecond precision
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(name: &str, quantity: i32, price: f64) -> CreateProduct {
        CreateProduct {
            name: name.to_string(),
            quantity,
            price,
            status: ProductStatus::default(),
        }
    }

    #[test]
    fn test_new_product_timestamps_match() {
        let product = Product::new(create("Widget", 5, 9.99));

        assert_eq!(product.created_at, product.updated_at);
        assert_eq!(product.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(product.status, ProductStatus::Active);
    }

    #[test]
    fn test_apply_update_keeps_untouched_fields() {
        let mut product = Product::new(create("Widget", 5, 9.99));
        let original = product.clone();

        product.apply_update(UpdateProduct {
            price: Some(12.5),
            ..Default::default()
        });

        assert_eq!(product.price, 12.5);
        assert_eq!(product.name, original.name);
        assert_eq!(product.quantity, original.quantity);
        assert_eq!(product.id, original.id);
        assert_eq!(product.created_at, original.created_at);
        assert!(product.updated_at >= original.updated_at);
    }

    #[test]
    fn test_create_validation() {
        assert!(create("Widget", 0, 0.0).validate().is_ok());
        assert!(create("", 1, 1.0).validate().is_err());
        assert!(create(&"x".repeat(201), 1, 1.0).validate().is_err());
        assert!(create("Widget", -1, 1.0).validate().is_err());
        assert!(create("Widget", 1, -0.01).validate().is_err());
    }

    #[test]
    fn test_update_validation_only_checks_present_fields() {
        assert!(UpdateProduct::default().validate().is_ok());

        let errors = UpdateProduct {
            name: Some(String::new()),
            quantity: Some(-3),
            ..Default::default()
        }
        .validate()
        .unwrap_err();

        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("quantity"));
        assert!(!fields.contains_key("price"));
    }

    #[test]
    fn test_update_null_means_unchanged() {
        let patch: UpdateProduct =
            serde_json::from_str(r#"{"name": null, "price": 3.5, "created_at": "2020-01-01T00:00:00Z"}"#)
                .unwrap();

        assert_eq!(patch.name, None);
        assert_eq!(patch.price, Some(3.5));
        assert!(!patch.is_empty());
        assert!(UpdateProduct::default().is_empty());
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(ProductStatus::Inactive).unwrap(),
            serde_json::json!("inactive")
        );
        assert_eq!(ProductStatus::Inactive.to_string(), "inactive");
        assert_eq!("active".parse::<ProductStatus>().unwrap(), ProductStatus::Active);
    }

    #[test]
    fn test_create_request_reports_every_missing_field() {
        let request: CreateProductRequest = serde_json::from_str("{}").unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        for field in ["name", "quantity", "price"] {
            assert_eq!(fields[field][0].code, "required", "{field}");
        }
        assert!(!fields.contains_key("status"));
    }

    #[test]
    fn test_create_request_reports_mistyped_and_invalid_together() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "", "quantity": "many", "price": "free", "status": "gone"}"#)
                .unwrap();

        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["name"][0].code, "length");
        assert_eq!(fields["quantity"][0].code, "type");
        assert_eq!(fields["price"][0].code, "type");
        assert_eq!(fields["status"][0].code, "type");
    }

    #[test]
    fn test_create_request_converts_when_valid() {
        let request: CreateProductRequest =
            serde_json::from_str(r#"{"name": "Widget", "quantity": 2, "price": 3}"#).unwrap();

        let input = CreateProduct::try_from(request).unwrap();
        assert_eq!(input.name, "Widget");
        assert_eq!(input.quantity, 2);
        assert_eq!(input.price, 3.0);
        assert_eq!(input.status, ProductStatus::Active);
    }

    #[test]
    fn test_update_request_rejects_mistyped_fields_only() {
        let request: UpdateProductRequest =
            serde_json::from_str(r#"{"quantity": 1.5, "price": null, "updated_at": "2000-01-01T00:00:00Z"}"#)
                .unwrap();

        let errors = UpdateProduct::try_from(request).unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["quantity"][0].code, "type");
        assert!(!fields.contains_key("price"));

        let request: UpdateProductRequest = serde_json::from_str(r#"{"price": 4.25}"#).unwrap();
        assert_eq!(
            UpdateProduct::try_from(request).unwrap(),
            UpdateProduct {
                price: Some(4.25),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_filter_rejects_non_finite_bounds() {
        assert!(ProductFilter::new(Some(1.0), None).check_bounds().is_ok());
        assert!(ProductFilter::default().check_bounds().is_ok());

        for filter in [
            ProductFilter::new(Some(f64::NAN), None),
            ProductFilter::new(None, Some(f64::INFINITY)),
            ProductFilter::new(Some(f64::NEG_INFINITY), Some(10.0)),
        ] {
            assert!(matches!(
                filter.check_bounds(),
                Err(ProductError::InvalidFilter(_))
            ));
        }
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let filter = ProductFilter::new(Some(10.0), Some(20.0));
        assert!(filter.matches(10.0));
        assert!(filter.matches(20.0));
        assert!(!filter.matches(9.99));
        assert!(!filter.matches(20.01));

        assert!(ProductFilter::default().matches(0.0));
        assert!(ProductFilter::new(None, Some(5.0)).matches(0.0));
        assert!(!ProductFilter::new(Some(20.0), Some(10.0)).matches(15.0));
    }
}
