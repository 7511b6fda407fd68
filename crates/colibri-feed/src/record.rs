//! Raw Colibri feed record types.
//!
//! ## Observed shape of the product export
//!
//! Each row is a flat JSON object keyed by the upstream column names
//! (`CODIGO_SKU`, `TITULO`, …). Two quirks the types below absorb:
//!
//! - Numeric columns (`PRECIO_NORMAL`, `STOCK`, …) arrive as JSON numbers
//!   from some export paths and as numeric strings (`"50.00"`) from others.
//!   Accessors coerce both.
//! - Attribute columns are dynamically named per export
//!   (`NOMBRE_DE_ATRIBUTO_COLOR`, `VALOR_DE_ATRIBUTO_COLOR`,
//!   `ATRIBUTO_VISIBLE_COLOR`, `ATRIBUTO_COLOR_ES_VARIABLE`, with the legacy
//!   spelling `ATRIBUTO_COLOR_VARIABLE` still in circulation). They are
//!   captured by the flattened `extra` map and interpreted by the engine's
//!   attribute extractor.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

/// One row from the upstream product feed.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Group SKU shared by every variant row of one logical product.
    #[serde(rename = "CODIGO_SKU", default)]
    pub codigo_sku: Option<String>,

    /// Variation-level unique code; identity of one specific variant.
    #[serde(rename = "CODIGO_UNICO", default)]
    pub codigo_unico: Option<String>,

    /// `"simple"` or `"variable"`, matched case-insensitively.
    #[serde(rename = "TIPO_DE_PRODUCTO", default)]
    pub tipo_de_producto: Option<String>,

    #[serde(rename = "TITULO", default)]
    pub titulo: Option<String>,

    #[serde(rename = "DESCRIPCION_CORTA", default)]
    pub descripcion_corta: Option<String>,

    #[serde(rename = "PRECIO_NORMAL", default)]
    precio_normal: Option<Value>,

    #[serde(rename = "PRECIO_DESCUENTO", default)]
    precio_descuento: Option<Value>,

    #[serde(rename = "STOCK", default)]
    stock: Option<Value>,

    #[serde(rename = "STOCK_MINIMO", default)]
    stock_minimo: Option<Value>,

    /// Filename of the principal image, relative to the media base URL.
    #[serde(rename = "IMAGEN_PRINCIPAL", default)]
    pub imagen_principal: Option<String>,

    /// `|`-separated gallery filenames, possibly with a trailing separator.
    #[serde(rename = "OTRAS_IMAGENES", default)]
    pub otras_imagenes: Option<String>,

    /// `>`-separated category breadcrumb, e.g. `"Ropa > Camisas > Manga Larga"`.
    #[serde(rename = "CATEGORIAS_CONCATENADAS", default)]
    pub categorias_concatenadas: Option<String>,

    /// Everything else, including the dynamically-named attribute columns.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl RawRecord {
    /// Group SKU, `None` when absent or empty.
    #[must_use]
    pub fn group_sku(&self) -> Option<&str> {
        non_empty(self.codigo_sku.as_deref())
    }

    /// Variation-level unique code, `None` when absent or empty.
    #[must_use]
    pub fn unique_code(&self) -> Option<&str> {
        non_empty(self.codigo_unico.as_deref())
    }

    /// Whether the type tag routes this record down the variable path.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        self.tipo_de_producto
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("variable"))
    }

    #[must_use]
    pub fn title(&self) -> &str {
        self.titulo.as_deref().unwrap_or_default()
    }

    #[must_use]
    pub fn description(&self) -> &str {
        self.descripcion_corta.as_deref().unwrap_or_default()
    }

    /// Regular price; zero when missing or unparseable.
    #[must_use]
    pub fn regular_price(&self) -> Decimal {
        self.precio_normal
            .as_ref()
            .and_then(decimal_from_value)
            .unwrap_or(Decimal::ZERO)
    }

    /// Discount price as sent; validity against the regular price is the
    /// engine's concern.
    #[must_use]
    pub fn sale_price(&self) -> Option<Decimal> {
        self.precio_descuento.as_ref().and_then(decimal_from_value)
    }

    /// Stock count; zero when missing or unparseable.
    #[must_use]
    pub fn stock_quantity(&self) -> i32 {
        self.stock.as_ref().and_then(int_from_value).unwrap_or(0)
    }

    #[must_use]
    pub fn low_stock_threshold(&self) -> Option<i32> {
        self.stock_minimo.as_ref().and_then(int_from_value)
    }

    /// Principal image filename, `None` when absent or empty.
    #[must_use]
    pub fn principal_image(&self) -> Option<&str> {
        non_empty(self.imagen_principal.as_deref())
    }

    /// Gallery filenames with empty segments (and a trailing `|`) dropped.
    #[must_use]
    pub fn gallery_files(&self) -> Vec<&str> {
        self.otras_imagenes
            .as_deref()
            .map(|raw| {
                raw.split('|')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Category breadcrumb segments, trimmed, empty segments dropped.
    #[must_use]
    pub fn category_path(&self) -> Vec<&str> {
        self.categorias_concatenadas
            .as_deref()
            .map(|raw| {
                raw.split('>')
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Textual value of a dynamically-named extra column. Numbers are
    /// rendered as text so numeric attribute values (`38`, `40`) behave the
    /// same as string ones.
    #[must_use]
    pub fn extra_text(&self, key: &str) -> Option<String> {
        match self.extra.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Current price and stock for one unique code, as returned by the
/// `producto-detalles` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceStockUpdate {
    pub regular_price: Decimal,
    pub sale_price: Option<Decimal>,
    pub stock_quantity: i32,
}

/// Wire shape of the `producto-detalles` response; validated into a
/// [`PriceStockUpdate`] by the client.
#[derive(Debug, Deserialize)]
pub(crate) struct DetailResponse {
    #[serde(rename = "PRECIO_NORMAL", default)]
    pub precio_normal: Option<Value>,
    #[serde(rename = "PRECIO_DESCUENTO", default)]
    pub precio_descuento: Option<Value>,
    #[serde(rename = "STOCK", default)]
    pub stock: Option<Value>,
}

impl DetailResponse {
    /// Validates the payload: `PRECIO_NORMAL` and `STOCK` are required,
    /// `PRECIO_DESCUENTO` is optional.
    pub(crate) fn into_update(self) -> Result<PriceStockUpdate, String> {
        let regular_price = self
            .precio_normal
            .as_ref()
            .and_then(decimal_from_value)
            .ok_or("missing or unparseable PRECIO_NORMAL")?;
        let stock_quantity = self
            .stock
            .as_ref()
            .and_then(int_from_value)
            .ok_or("missing or unparseable STOCK")?;
        let sale_price = self.precio_descuento.as_ref().and_then(decimal_from_value);
        Ok(PriceStockUpdate {
            regular_price,
            sale_price,
            stock_quantity,
        })
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn decimal_from_value(v: &Value) -> Option<Decimal> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn int_from_value(v: &Value) -> Option<i32> {
    match v {
        Value::String(s) => s.trim().parse().ok(),
        // Stock occasionally exports as "3.0"; truncate toward zero.
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .and_then(|i| i32::try_from(i).ok()),
        _ => None,
    }
}
