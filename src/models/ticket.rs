// ============================================================================
// TICKET - Datos del ticket y resultado de la validación
// ============================================================================

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Datos del ticket que devuelve la API de ticketing para un escaneo válido
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ticket {
    #[serde(deserialize_with = "lenient_string")]
    pub event_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub first_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub last_name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub identity_number: String,
    #[serde(deserialize_with = "lenient_string")]
    pub email: String,
    /// En el JSON viene como `orderid`
    #[serde(rename = "orderid", deserialize_with = "lenient_string")]
    pub order_id: String,
}

impl Ticket {
    pub fn holder_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

// Los números de orden y de identidad a veces llegan como números JSON.
// Null, objetos y arrays quedan como "".
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Valid,
    Invalid,
}

/// Resultado de una validación
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationOutcome {
    Valid(Ticket),
    Invalid(String),
}

impl ValidationOutcome {
    pub fn verdict(&self) -> Verdict {
        match self {
            ValidationOutcome::Valid(_) => Verdict::Valid,
            ValidationOutcome::Invalid(_) => Verdict::Invalid,
        }
    }
}
