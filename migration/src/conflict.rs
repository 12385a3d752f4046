use sea_orm::DbErr;

/// 判断脚本执行失败是否属于“目标对象已存在”的可恢复冲突
pub trait ConflictPolicy: Send + Sync {
    fn is_conflict(&self, err: &DbErr) -> bool;
}

/// 基于驱动错误文本的子串匹配（区分大小写）
///
/// 匹配 `already exists` 或 `duplicate key`，不依赖 SQLSTATE，
/// 需要按数据库区分时可替换为其他 [`ConflictPolicy`]。
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageHeuristic;

const CONFLICT_MARKERS: [&str; 2] = ["already exists", "duplicate key"];

impl ConflictPolicy for MessageHeuristic {
    fn is_conflict(&self, err: &DbErr) -> bool {
        let message = err.to_string();
        CONFLICT_MARKERS
            .iter()
            .any(|marker| message.contains(marker))
    }
}

impl<F> ConflictPolicy for F
where
    F: Fn(&DbErr) -> bool + Send + Sync,
{
    fn is_conflict(&self, err: &DbErr) -> bool {
        self(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_matches_markers() {
        let policy = MessageHeuristic;
        assert!(policy.is_conflict(&DbErr::Custom(
            "relation \"users\" already exists".into()
        )));
        assert!(policy.is_conflict(&DbErr::Custom(
            "duplicate key value violates unique constraint".into()
        )));
    }

    #[test]
    fn test_heuristic_is_case_sensitive() {
        let policy = MessageHeuristic;
        assert!(!policy.is_conflict(&DbErr::Custom("Table Already Exists".into())));
        assert!(!policy.is_conflict(&DbErr::Custom("syntax error at or near".into())));
    }

    #[test]
    fn test_closure_policy() {
        let never = |_: &DbErr| false;
        assert!(!never.is_conflict(&DbErr::Custom("already exists".into())));
    }
}
