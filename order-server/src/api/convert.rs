//! Conversion helpers shared by the API handlers

use serde::de::DeserializeOwned;
use serde_json::Value;

use shared::error::AppError;

use crate::store::StoreError;

/// Decode store documents into models, dropping (and logging) malformed
/// ones instead of failing the whole listing.
pub fn decode_documents<T: DeserializeOwned>(docs: Vec<Value>) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed document");
                None
            }
        })
        .collect()
}

/// Decode a single document that is required to be well-formed.
pub fn decode_document<T: DeserializeOwned>(doc: Value) -> Result<T, AppError> {
    serde_json::from_value(doc).map_err(|e| AppError::internal(format!("corrupt document: {e}")))
}

/// Map store failures onto API errors.
pub fn store_error(err: StoreError) -> AppError {
    match err {
        StoreError::NotFound { collection, id } => {
            AppError::not_found(format!("{collection}/{id}"))
        }
        StoreError::TransactionExhausted(attempts) => AppError::allocation(format!(
            "transaction aborted after {attempts} conflicting attempts"
        )),
        other => AppError::database(other.to_string()),
    }
}
