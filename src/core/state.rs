//! 单次预测请求的阶段
//!
//! Received → Decoded → Classified → Calibrated → Recommended → Responded。
//! 只有 Received → Decoded 的失败会以 400 终止请求；之后的阶段都有降级路径，
//! 只剩编程错误会以 500 终止。

use std::fmt;

use crate::core::PredictError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum RequestPhase {
    Received,
    Decoded,
    Classified,
    Calibrated,
    Recommended,
    Responded,
}

impl RequestPhase {
    /// 下一阶段；Responded 为终态
    pub fn next(self) -> Option<RequestPhase> {
        match self {
            RequestPhase::Received => Some(RequestPhase::Decoded),
            RequestPhase::Decoded => Some(RequestPhase::Classified),
            RequestPhase::Classified => Some(RequestPhase::Calibrated),
            RequestPhase::Calibrated => Some(RequestPhase::Recommended),
            RequestPhase::Recommended => Some(RequestPhase::Responded),
            RequestPhase::Responded => None,
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPhase::Received => "received",
            RequestPhase::Decoded => "decoded",
            RequestPhase::Classified => "classified",
            RequestPhase::Calibrated => "calibrated",
            RequestPhase::Recommended => "recommended",
            RequestPhase::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// 请求阶段跟踪：只允许按顺序前进一步
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phase: RequestPhase,
}

impl Default for PhaseTracker {
    fn default() -> Self {
        Self {
            phase: RequestPhase::Received,
        }
    }
}

impl PhaseTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> RequestPhase {
        self.phase
    }

    /// 前进到 `to`；跳阶段或回退属于编程错误
    pub fn advance(&mut self, to: RequestPhase) -> Result<(), PredictError> {
        if self.phase.next() != Some(to) {
            return Err(PredictError::IllegalTransition {
                from: self.phase,
                to,
            });
        }
        tracing::debug!(from = %self.phase, to = %to, "phase transition");
        self.phase = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_sequence() {
        let mut tracker = PhaseTracker::new();
        for to in [
            RequestPhase::Decoded,
            RequestPhase::Classified,
            RequestPhase::Calibrated,
            RequestPhase::Recommended,
            RequestPhase::Responded,
        ] {
            tracker.advance(to).unwrap();
        }
        assert_eq!(tracker.current(), RequestPhase::Responded);
        assert_eq!(tracker.current().next(), None);
    }

    #[test]
    fn test_skipping_is_rejected() {
        let mut tracker = PhaseTracker::new();
        let err = tracker.advance(RequestPhase::Classified).unwrap_err();
        assert!(matches!(
            err,
            PredictError::IllegalTransition {
                from: RequestPhase::Received,
                to: RequestPhase::Classified
            }
        ));
        assert_eq!(tracker.current(), RequestPhase::Received);
    }

    #[test]
    fn test_responded_is_terminal() {
        let mut tracker = PhaseTracker::new();
        for to in [
            RequestPhase::Decoded,
            RequestPhase::Classified,
            RequestPhase::Calibrated,
            RequestPhase::Recommended,
            RequestPhase::Responded,
        ] {
            tracker.advance(to).unwrap();
        }
        assert!(tracker.advance(RequestPhase::Responded).is_err());
    }
}
