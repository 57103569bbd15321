use serde::de::DeserializeOwned;

/// Deserialize request params into a typed struct. Absent params arrive
/// as JSON null and mean "no criteria", not a malformed request.
pub fn parse_params<T>(params: &serde_json::Value) -> Result<T, serde_json::Error>
where
    T: DeserializeOwned + Default,
{
    if params.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(params.clone())
}
