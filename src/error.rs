use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum TripMapError {
    DatasetParse(serde_json::Error),
    DuplicateAttraction { id: String },
    Options(String),
}

impl std::fmt::Display for TripMapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DatasetParse(e) => write!(f, "Dataset parse error: {e}"),
            Self::DuplicateAttraction { id } => {
                write!(f, "Duplicate attraction id '{id}' in dataset")
            }
            Self::Options(msg) => write!(f, "Invalid map options: {msg}"),
        }
    }
}

impl std::error::Error for TripMapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DatasetParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TripMapError {
    fn from(e: serde_json::Error) -> Self {
        Self::DatasetParse(e)
    }
}

impl From<TripMapError> for JsValue {
    fn from(e: TripMapError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
