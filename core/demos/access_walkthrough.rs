//! Example: signing in under each role and narrowing record collections
//!
//! Run with `RUST_LOG=debug` to see every permission decision.

use anyhow::Result;
use std::sync::Arc;
use talentscope_core::{
    Action, Config, Credentials, MemorySessionStorage, PersonnelRecord, QualificationStandard,
    RbacManager, Resource, Role, SessionStore, rbac::process_audit_logs,
};
use tracing_subscriber::EnvFilter;

fn personnel() -> Vec<PersonnelRecord> {
    vec![
        PersonnelRecord::new("EMP001", "张三", "技术体系").with_department("研发部"),
        PersonnelRecord::new("EMP002", "钱七", "产品体系").with_department("产品部"),
        PersonnelRecord::new("EMP003", "孙八", "销售体系").with_department("华东大区"),
    ]
}

fn standards() -> Vec<QualificationStandard> {
    vec![QualificationStandard {
        id: "STD-1".to_string(),
        title: "后端工程师任职资格".to_string(),
        system: "技术体系".to_string(),
        level: "P5".to_string(),
        created_by: "COE001".to_string(),
    }]
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = Config::default();
    config.rbac.audit = true;
    let (manager, audit) = RbacManager::from_config(&config.rbac);
    if let Some(receiver) = audit {
        tokio::spawn(process_audit_logs(receiver));
    }

    let session = Arc::new(SessionStore::new(Arc::new(MemorySessionStorage::default())));
    let personnel = personnel();
    let standards = standards();

    for role in Role::ALL {
        let user = session
            .authenticate(&Credentials::new("demo", "demo"), role, None)
            .await?;
        let current = session.current();
        let caps = manager.capabilities(current.as_ref());

        println!("== {} ({}) ==", user.name, role.label());
        println!("  scope: {:?}", caps.scope);
        println!("  systems: {:?}", caps.accessible_systems);
        for record in manager.visible_personnel(current.as_ref(), &personnel) {
            println!("  sees {} ({})", record.name, record.system);
        }
        println!(
            "  standards visible: {}",
            manager.visible_standards(current.as_ref(), &standards).len()
        );

        let delete = manager.authorize_record(
            current.as_ref(),
            Resource::Standards,
            Action::Delete,
            &standards[0],
        );
        match delete {
            Ok(()) => println!("  may delete {}", standards[0].id),
            Err(denied) => println!("  {}", denied),
        }
    }

    session.end_session().await?;
    println!("signed out: {:?}", session.current());

    Ok(())
}
