//! Lookup loader: nested category document to a flat id -> name map

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::config::{MissingFieldPolicy, PipelineConfig};
use crate::error::{common, ErrorCode, ErrorExt, PipelineError, Result};
use crate::handoff::{HandOff, CATEGORY_MAP};
use crate::model::CategoryMap;
use crate::preview::format_grid;

/// Load the category document named by `config.json_path` and hand off the map
pub async fn load_categories(
    config: &PipelineConfig,
    handoff: &dyn HandOff,
) -> Result<CategoryMap> {
    let path = &config.json_path;
    info!("Loading category document from {}", path.display());

    let content = fs::read_to_string(path).await.map_err(|e| {
        common::source_read_failed(e, path, ErrorCode::NOT_FOUND_CATEGORY_DOCUMENT)
    })?;
    let categories = parse_categories(&content, config.missing_field_policy)
        .map_err(|e| e.with_path(path))?;

    let rows: Vec<Vec<String>> = categories
        .iter()
        .map(|(id, name)| vec![id.to_string(), name.to_string()])
        .collect();
    info!("\n{}", format_grid(&["category_id", "category_name"], &rows));

    let value = serde_json::to_value(&categories)
        .to_handoff_error("Failed to serialize category map")?;
    handoff.put(CATEGORY_MAP, value).await?;
    Ok(categories)
}

/// Flatten `items[].id` / `items[].snippet.title` into a [`CategoryMap`]
///
/// A document without `items` yields an empty map. Items lacking either
/// field are handled according to `policy`.
pub fn parse_categories(content: &str, policy: MissingFieldPolicy) -> Result<CategoryMap> {
    let document: Value = serde_json::from_str(content)
        .to_parse_error(ErrorCode::PARSE_JSON, "invalid JSON document")?;

    let object = document.as_object().ok_or_else(|| {
        PipelineError::parse_with_code(
            ErrorCode::PARSE_JSON,
            "category document must be a JSON object",
        )
    })?;

    let items = match object.get("items") {
        None => {
            warn!("Category document has no 'items' list");
            return Ok(CategoryMap::new());
        }
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(PipelineError::parse_with_code(
                ErrorCode::PARSE_JSON,
                "'items' must be a list",
            ))
        }
    };

    let mut categories = CategoryMap::new();
    let mut skipped = 0usize;
    for (index, item) in items.iter().enumerate() {
        match category_entry(item, index) {
            Ok((id, name)) => categories.insert(id, name),
            Err(e) => match policy {
                MissingFieldPolicy::Abort => return Err(e),
                MissingFieldPolicy::Skip => {
                    warn!("Skipping category item {}: {}", index, e);
                    skipped += 1;
                }
            },
        }
    }

    debug!(
        "Parsed {} categories from {} items ({} skipped)",
        categories.len(),
        items.len(),
        skipped
    );
    Ok(categories)
}

/// Decode the `category_map` hand-off value
pub fn decode_categories(value: &Value) -> Result<CategoryMap> {
    serde_json::from_value(value.clone()).to_parse_error(
        ErrorCode::PARSE_HANDOFF_PAYLOAD,
        format!("'{}' must be an object of id -> name strings", CATEGORY_MAP),
    )
}

fn category_entry(item: &Value, index: usize) -> Result<(String, String)> {
    let context = format!("category item {}", index);

    let id = match item.get("id") {
        None | Some(Value::Null) => return Err(common::missing_field("id", &context)),
        Some(Value::String(id)) => id.clone(),
        Some(Value::Number(n)) if n.is_i64() || n.is_u64() => n.to_string(),
        Some(_) => return Err(invalid_type("id", "a string or integer", &context)),
    };

    let snippet = match item.get("snippet") {
        None | Some(Value::Null) => return Err(common::missing_field("snippet", &context)),
        Some(snippet @ Value::Object(_)) => snippet,
        Some(_) => return Err(invalid_type("snippet", "an object", &context)),
    };

    let title = match snippet.get("title") {
        None | Some(Value::Null) => return Err(common::missing_field("snippet.title", &context)),
        Some(Value::String(title)) => title.clone(),
        Some(_) => return Err(invalid_type("snippet.title", "a string", &context)),
    };

    Ok((id, title))
}

fn invalid_type(field: &str, expected: &str, context: &str) -> PipelineError {
    PipelineError::schema(
        ErrorCode::SCHEMA_INVALID_TYPE,
        format!("'{}' must be {} in {}", field, expected, context),
        Some(field.to_string()),
    )
}
