//! 현재 선택된 신체 측면 보관.
//!
//! 모든 WebSocket 연결이 하나의 선택값을 공유한다.
//! 라벨은 받은 그대로 보관하여 `/set_side/{side}` 응답에 그대로 돌려준다.

use std::sync::Arc;

use parking_lot::RwLock;

use super::pose::Side;

/// 공유 측면 선택값 (복제 시 같은 값을 가리킴)
#[derive(Debug, Clone, Default)]
pub struct SideSelection {
    label: Arc<RwLock<String>>,
}

impl SideSelection {
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            label: Arc::new(RwLock::new(initial.into())),
        }
    }

    /// 라벨 저장 후 저장된 값 반환
    pub fn set(&self, label: impl Into<String>) -> String {
        let label = label.into();
        *self.label.write() = label.clone();
        label
    }

    /// 현재 라벨 (설정된 적 없으면 빈 문자열)
    pub fn label(&self) -> String {
        self.label.read().clone()
    }

    /// 현재 라벨을 해석한 측면
    pub fn side(&self) -> Side {
        Side::from_label(&self.label.read())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_draws_nothing() {
        let selection = SideSelection::default();
        assert_eq!(selection.label(), "");
        assert_eq!(selection.side(), Side::None);
    }

    #[test]
    fn clones_share_state() {
        let selection = SideSelection::new("");
        let other = selection.clone();
        assert_eq!(other.set("right"), "right");
        assert_eq!(selection.side(), Side::Right);
    }

    #[test]
    fn unknown_label_is_kept_verbatim() {
        let selection = SideSelection::new("left");
        selection.set("sideways");
        assert_eq!(selection.label(), "sideways");
        assert_eq!(selection.side(), Side::None);
    }
}
