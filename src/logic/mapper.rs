//! Extraction result mapper: validate the backend's JSON and build sanitized internal records.
//!
//! Every EXP-bearing field passes through the sanitizer exactly once, here and nowhere else.

use crate::error::ProcessingError;
use crate::logic::sanitize::{sanitize_digits, sanitize_exp};
use crate::models::{AggregatedStatistics, PlayerObservation, PlayerRecord, ProcessedImageResult};
use serde::Serialize;
use serde_json::{Map, Value};

/// Where in the response a skipped record was found.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSection {
    ProcessedImage,
    ImagePlayer,
    AggregatedPlayer,
}

/// A malformed record left out of an otherwise valid batch.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub section: RecordSection,
    pub index: usize,
    pub reason: String,
}

/// One backend response, validated and sanitized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappedBatch {
    pub images: Vec<ProcessedImageResult>,
    /// Per-nickname aggregates for this batch (input to the ledger merge).
    pub players: Vec<PlayerRecord>,
    /// The backend's own statistics, renamed and sanitized. Informational only.
    pub reported_statistics: Option<AggregatedStatistics>,
    pub skipped: Vec<SkippedRecord>,
}

/// Map a raw backend response.
///
/// Fails when the success flag is not `true` (carrying the backend's `error` text) or when the
/// envelope lacks the `processed_images` / `aggregated_players` lists. A malformed entry inside
/// those lists is skipped and reported in [`MappedBatch::skipped`].
pub fn map_backend_response(raw: &Value) -> Result<MappedBatch, ProcessingError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| ProcessingError::Malformed("response is not a JSON object".into()))?;

    if obj.get("success").and_then(Value::as_bool) != Some(true) {
        let message = obj
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("Processing failed");
        return Err(ProcessingError::Rejected(message.to_string()));
    }

    let raw_images = required_list(obj, "processed_images")?;
    let raw_players = required_list(obj, "aggregated_players")?;

    let mut batch = MappedBatch::default();

    for (index, entry) in raw_images.iter().enumerate() {
        match map_image(entry, &mut batch.skipped) {
            Ok(image) => batch.images.push(image),
            Err(reason) => skip(&mut batch.skipped, RecordSection::ProcessedImage, index, reason),
        }
    }

    for (index, entry) in raw_players.iter().enumerate() {
        match map_aggregate(entry) {
            Ok(record) => batch.players.push(record),
            Err(reason) => skip(&mut batch.skipped, RecordSection::AggregatedPlayer, index, reason),
        }
    }

    batch.reported_statistics = match obj.get("statistics") {
        None | Some(Value::Null) => None,
        Some(stats) => match map_statistics(stats) {
            Ok(s) => Some(s),
            Err(reason) => {
                log::warn!("Ignoring backend statistics: {}", reason);
                None
            }
        },
    };

    Ok(batch)
}

fn required_list<'a>(obj: &'a Map<String, Value>, key: &str) -> Result<&'a Vec<Value>, ProcessingError> {
    obj.get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ProcessingError::Malformed(format!("`{}` must be a list", key)))
}

fn skip(skipped: &mut Vec<SkippedRecord>, section: RecordSection, index: usize, reason: String) {
    log::warn!("Skipping malformed {:?} #{}: {}", section, index, reason);
    skipped.push(SkippedRecord { section, index, reason });
}

fn map_image(entry: &Value, skipped: &mut Vec<SkippedRecord>) -> Result<ProcessedImageResult, String> {
    let obj = entry.as_object().ok_or("entry is not an object")?;
    let filename = non_empty_str(obj, "filename")?;

    let mut players = Vec::new();
    let raw_players = match obj.get("players") {
        None | Some(Value::Null) => &[] as &[Value],
        Some(Value::Array(list)) => list.as_slice(),
        Some(_) => return Err("`players` must be a list".into()),
    };
    for (index, p) in raw_players.iter().enumerate() {
        match map_observation(p, &filename) {
            Ok(obs) => players.push(obs),
            Err(reason) => skip(
                skipped,
                RecordSection::ImagePlayer,
                index,
                format!("{} (image {})", reason, filename),
            ),
        }
    }

    let player_count = match obj.get("player_count") {
        None | Some(Value::Null) => players.len() as u32,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or("`player_count` is not a count")?,
    };

    let error = match obj.get("error") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    };

    Ok(ProcessedImageResult {
        filename,
        player_count,
        players,
        error,
    })
}

fn map_observation(entry: &Value, filename: &str) -> Result<PlayerObservation, String> {
    let obj = entry.as_object().ok_or("player is not an object")?;
    let nickname = non_empty_str(obj, "nickname")?;
    let exp = sanitized_exp(obj.get("exp").ok_or("missing `exp`")?)?;
    Ok(PlayerObservation::new(nickname, exp, filename))
}

fn map_aggregate(entry: &Value) -> Result<PlayerRecord, String> {
    let obj = entry.as_object().ok_or("entry is not an object")?;
    let nickname = non_empty_str(obj, "nickname")?;
    let exp_field = obj
        .get("totalEXP")
        .or_else(|| obj.get("exp"))
        .ok_or_else(|| format!("`{}` has no `totalEXP`", nickname))?;
    let total_exp = sanitized_exp(exp_field)?;

    let images = match obj.get("images") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(list)) => list
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| format!("`{}` has a non-text image name", nickname))?,
        Some(_) => return Err(format!("`{}` images must be a list", nickname)),
    };

    let appearances = match obj.get("appearances") {
        None | Some(Value::Null) => images.len() as u32,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("`{}` appearances is not a count", nickname))?,
    };
    let record = PlayerRecord {
        nickname,
        total_exp,
        appearances,
        images,
    };
    if !record.is_consistent() {
        return Err(format!(
            "`{}` has {} appearances but {} images",
            record.nickname,
            record.appearances,
            record.images.len()
        ));
    }
    Ok(record)
}

fn map_statistics(entry: &Value) -> Result<AggregatedStatistics, String> {
    let obj = entry.as_object().ok_or("statistics is not an object")?;
    let count = |key: &str| -> Result<u32, String> {
        obj.get(key)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| format!("`{}` is not a count", key))
    };
    let exp = |key: &str| -> Result<u64, String> {
        sanitized_exp(obj.get(key).ok_or_else(|| format!("missing `{}`", key))?)
    };
    Ok(AggregatedStatistics {
        unique_players: count("unique_players")?,
        total_images: count("total_images")?,
        total_exp: exp("total_exp")?,
        avg_exp: exp("avg_exp")?,
    })
}

/// Trimmed, non-empty text field.
fn non_empty_str(obj: &Map<String, Value>, key: &str) -> Result<String, String> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| format!("missing `{}`", key))
}

/// Validate one EXP field and sanitize it. Accepts non-negative integers, integral floats and
/// digit strings.
fn sanitized_exp(value: &Value) -> Result<u64, String> {
    match value {
        Value::Number(n) => {
            let raw = n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f < u64::MAX as f64)
                        .map(|f| f as u64)
                })
                .ok_or_else(|| format!("EXP {} is not a non-negative integer", n))?;
            Ok(sanitize_exp(raw))
        }
        Value::String(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            sanitize_digits(s).map_err(|e| format!("EXP {:?} is out of range: {}", s, e))
        }
        other => Err(format!("EXP {} is not numeric", other)),
    }
}
