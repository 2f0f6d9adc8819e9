//! Destination page drafting

use crate::block::{Page, PageDraft, RichText};
use crate::error::{PipelineError, PipelineResult};
use crate::mt::LanguagePair;
use crate::pipeline::policy::MissingTitlePolicy;
use crate::sanitize::Sanitize;
use serde_json::{Map, Value, json};

/// Title used when the source page has none
pub const FALLBACK_TITLE: &str = "Translated page";

/// Top-level page fields besides parent and properties that are copied
const COPIED_FIELDS: [&str; 2] = ["icon", "cover"];

/// Draft of the translated copy of `original`, created as its child page
///
/// The title gets ` (<target>)` appended. A page created under another page
/// may only carry a `title` property, so the title is the only property kept;
/// of the other top-level fields only the icon and cover are copied.
pub fn draft_translation_target(
    original: &Page,
    pair: &LanguagePair,
    missing_title: &MissingTitlePolicy,
) -> PipelineResult<PageDraft> {
    let source_id = original
        .id
        .clone()
        .ok_or_else(|| PipelineError::Payload("source page has no id".to_string()))?;
    let suffix = format!(" ({})", pair.target);

    let mut page = original.clone();
    let runs = match title_runs(&original.properties) {
        Some(runs) if !runs.is_empty() => suffixed(runs, &suffix)?,
        _ => match missing_title {
            MissingTitlePolicy::Fail => return Err(PipelineError::MissingTitle),
            MissingTitlePolicy::Fallback(text) => {
                vec![serde_json::to_value(RichText::plain(&format!("{}{}", text, suffix)))?]
            }
        },
    };

    let mut properties = Map::new();
    properties.insert("title".to_string(), json!({ "title": runs }));
    page.properties = properties;
    page.parent = json!({ "page_id": source_id });
    page.url = None;
    page.extra.retain(|key, _| COPIED_FIELDS.contains(&key.as_str()));
    page.sanitize();

    Ok(PageDraft::from(page))
}

/// Runs of the `title` property, or of the first property typed `title`
pub fn title_runs(properties: &Map<String, Value>) -> Option<&Vec<Value>> {
    properties.get("title").and_then(runs_of).or_else(|| {
        properties
            .values()
            .find(|property| property.get("type").and_then(Value::as_str) == Some("title"))
            .and_then(runs_of)
    })
}

fn runs_of(property: &Value) -> Option<&Vec<Value>> {
    property.get("title").and_then(Value::as_array)
}

/// Concatenated plain text of the page title
pub fn title_text(page: &Page) -> String {
    title_runs(&page.properties)
        .map(|runs| {
            runs.iter()
                .filter_map(|run| run.get("plain_text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default()
}

/// Copy of `runs` with `suffix` appended to the last one
///
/// A trailing mention or equation is left alone and the suffix follows it as
/// a run of its own.
fn suffixed(runs: &[Value], suffix: &str) -> PipelineResult<Vec<Value>> {
    let mut runs = runs.to_vec();
    let last: Option<RichText> = runs.last().cloned().map(serde_json::from_value).transpose()?;

    match last {
        Some(mut run) if run.text.is_some() => {
            if let Some(text) = run.text.as_mut() {
                text.content.push_str(suffix);
            }
            run.plain_text.push_str(suffix);
            if let Some(slot) = runs.last_mut() {
                *slot = serde_json::to_value(run)?;
            }
        }
        _ => runs.push(serde_json::to_value(RichText::plain(suffix))?),
    }

    Ok(runs)
}
