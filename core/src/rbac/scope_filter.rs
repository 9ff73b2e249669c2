//! Record visibility by scope

use crate::rbac::role::{Scope, scope_of};
use crate::rbac::user::User;

/// A record that can be narrowed by scope
pub trait ScopedRecord {
    /// Identity of the user who owns the record
    fn owner_id(&self) -> &str;
    /// System tag of the record
    fn system(&self) -> &str;
    /// Identifier used in audit entries
    fn record_id(&self) -> Option<&str> {
        None
    }
}

impl<R: ScopedRecord + ?Sized> ScopedRecord for &R {
    fn owner_id(&self) -> &str {
        (**self).owner_id()
    }

    fn system(&self) -> &str {
        (**self).system()
    }

    fn record_id(&self) -> Option<&str> {
        (**self).record_id()
    }
}

/// Whether a single record falls inside the user's scope.
///
/// System matching is exact. A system-bound user without a system sees nothing.
pub fn is_visible<R: ScopedRecord + ?Sized>(user: Option<&User>, record: &R) -> bool {
    let Some(user) = user else {
        return false;
    };

    match scope_of(user.role) {
        Scope::Global => true,
        Scope::SystemBound => user.system().is_some_and(|s| record.system() == s),
        Scope::SelfOnly => record.owner_id() == user.id,
    }
}

/// Records visible to `user`, in their original order
pub fn filter_by_scope<'a, R: ScopedRecord>(user: Option<&User>, records: &'a [R]) -> Vec<&'a R> {
    records.iter().filter(|r| is_visible(user, *r)).collect()
}

/// Owned variant of [`filter_by_scope`]
pub fn retain_by_scope<R: ScopedRecord>(user: Option<&User>, mut records: Vec<R>) -> Vec<R> {
    records.retain(|r| is_visible(user, r));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::role::Role;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        owner: &'static str,
        system: &'static str,
    }

    impl ScopedRecord for Row {
        fn owner_id(&self) -> &str {
            self.owner
        }

        fn system(&self) -> &str {
            self.system
        }
    }

    fn rows() -> Vec<Row> {
        vec![
            Row {
                id: 1,
                owner: "EMP1",
                system: "技术体系",
            },
            Row {
                id: 2,
                owner: "EMP2",
                system: "产品体系",
            },
            Row {
                id: 3,
                owner: "EMP3",
                system: "技术体系",
            },
        ]
    }

    fn ids(rows: &[&Row]) -> Vec<u32> {
        rows.iter().map(|r| r.id).collect()
    }

    #[test]
    fn test_no_user_sees_nothing() {
        assert!(filter_by_scope(None, &rows()).is_empty());
        assert!(retain_by_scope::<Row>(None, rows()).is_empty());
    }

    #[test]
    fn test_global_scope_is_identity() {
        let coe = User::new("COE1", "王五", Role::Coe);
        let records = rows();
        assert_eq!(ids(&filter_by_scope(Some(&coe), &records)), vec![1, 2, 3]);
    }

    #[test]
    fn test_system_bound_keeps_order() {
        let hrbp = User::new("HR1", "李四", Role::Hrbp).with_system("技术体系");
        let records = rows();
        assert_eq!(ids(&filter_by_scope(Some(&hrbp), &records)), vec![1, 3]);
    }

    #[test]
    fn test_system_bound_without_system_sees_nothing() {
        let leader = User::new("SL1", "赵六", Role::SystemLeader).with_system("");
        assert!(filter_by_scope(Some(&leader), &rows()).is_empty());
    }

    #[test]
    fn test_system_match_is_exact() {
        let hrbp = User::new("HR1", "李四", Role::Hrbp).with_system("技术");
        assert!(filter_by_scope(Some(&hrbp), &rows()).is_empty());
    }

    #[test]
    fn test_self_only() {
        let employee = User::new("EMP1", "张三", Role::Employee);
        let records = rows();
        assert_eq!(ids(&filter_by_scope(Some(&employee), &records)), vec![1]);

        let stranger = User::new("EMP9", "路人", Role::Employee);
        assert!(filter_by_scope(Some(&stranger), &records).is_empty());
    }

    #[test]
    fn test_retain_by_scope_matches_filter() {
        let hrbp = User::new("HR1", "李四", Role::Hrbp).with_system("产品体系");
        let kept = retain_by_scope(Some(&hrbp), rows());
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }
}
