use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Already at the open-position limit.
    ExposureCap,
    /// Two percent of cash does not buy a whole share.
    ZeroSize,
}

impl RejectReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExposureCap => "exposure_cap",
            Self::ZeroSize => "zero_size",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum RuntimeEventKind {
    Entry {
        strategy: &'static str,
        confidence: f64,
        quantity: u64,
        price: f64,
    },
    ForcedExit {
        reason: &'static str,
        quantity: u64,
        price: f64,
        realized_pnl: f64,
    },
    SignalExit {
        strategy: &'static str,
        quantity: u64,
        price: f64,
        realized_pnl: f64,
    },
    RiskReject {
        strategy: &'static str,
        reason: RejectReason,
        requested_qty: u64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RuntimeEvent {
    pub cycle: u64,
    pub symbol: String,
    #[serde(flatten)]
    pub kind: RuntimeEventKind,
}

impl RuntimeEvent {
    pub fn new(cycle: u64, symbol: impl Into<String>, kind: RuntimeEventKind) -> Self {
        Self {
            cycle,
            symbol: symbol.into(),
            kind,
        }
    }

    pub fn is_fill(&self) -> bool {
        !matches!(self.kind, RuntimeEventKind::RiskReject { .. })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{RejectReason, RuntimeEvent, RuntimeEventKind};

    #[test]
    fn serializes_flat_with_event_type_tag() {
        let event = RuntimeEvent::new(
            3,
            "AAPL",
            RuntimeEventKind::RiskReject {
                strategy: "Breakout",
                reason: RejectReason::ExposureCap,
                requested_qty: 12,
            },
        );

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(
            value,
            json!({
                "cycle": 3,
                "symbol": "AAPL",
                "event_type": "risk_reject",
                "strategy": "Breakout",
                "reason": "exposure_cap",
                "requested_qty": 12
            })
        );
        assert!(!event.is_fill());
    }
}
