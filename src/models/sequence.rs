//! Secuencias de numeración por tenant
//!
//! Cada (garage, tipo) tiene su propio contador; el store lo incrementa de
//! forma atómica y aquí solo se da formato al valor asignado.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    Quotation,
    Invoice,
    Payment,
    GatePass,
}

impl SequenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceKind::Quotation => "quotation",
            SequenceKind::Invoice => "invoice",
            SequenceKind::Payment => "payment",
            SequenceKind::GatePass => "gate_pass",
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            SequenceKind::Quotation => "QUO",
            SequenceKind::Invoice => "INV",
            SequenceKind::Payment => "PAY",
            SequenceKind::GatePass => "GP",
        }
    }

    /// Número visible para humanos, p.ej. `PAY-000042`
    pub fn format(&self, value: i64) -> String {
        format!("{}-{:06}", self.prefix(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(SequenceKind::Quotation.format(1), "QUO-000001");
        assert_eq!(SequenceKind::GatePass.format(42), "GP-000042");
        assert_eq!(SequenceKind::Payment.format(1_234_567), "PAY-1234567");
    }
}
