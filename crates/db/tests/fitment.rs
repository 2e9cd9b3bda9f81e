use assert_matches::assert_matches;
use chrono::NaiveDate;
use sqlx::PgPool;
use stockroom_core::types::DbId;
use stockroom_db::models::engine::CreateEngine;
use stockroom_db::models::fitment::{LinkEngine, LinkPart};
use stockroom_db::models::machine::CreateMachine;
use stockroom_db::models::part::CreatePart;
use stockroom_db::repositories::{
    EngineFitmentRepo, EngineRepo, MachineFitmentRepo, MachineRepo, PartRepo,
};

fn machine(model: &str, year: i32) -> CreateMachine {
    CreateMachine {
        make: "Deere".to_string(),
        model: model.to_string(),
        year,
        machine_type: "Tractor".to_string(),
        market_type: "Agriculture".to_string(),
    }
}

async fn engine(pool: &PgPool, model: &str) -> DbId {
    let input = CreateEngine {
        engine_make: "Cummins".to_string(),
        engine_model: model.to_string(),
        serial_number: None,
        cpl_number: None,
        ar_number: None,
        cylinder: None,
        compression_ratio: None,
        price: None,
        status: None,
        notes: None,
    };
    EngineRepo::create(pool, &input).await.unwrap().id
}

async fn part(pool: &PgPool, part_number: &str) -> DbId {
    let input = CreatePart {
        part_number: part_number.to_string(),
        name: format!("Part {part_number}"),
        category_id: None,
        manufacturer: None,
        unit: None,
        part_type: None,
        manufacturer_type: None,
    };
    PartRepo::create(pool, &input).await.unwrap().id
}

fn link_engine(engine_id: DbId, is_primary: bool) -> LinkEngine {
    LinkEngine {
        engine_id,
        notes: None,
        is_primary,
    }
}

fn link_part(part_id: DbId) -> LinkPart {
    LinkPart {
        part_id,
        notes: Some("OEM fit".to_string()),
        is_primary: false,
    }
}

fn constraint(err: sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
        _ => None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_machine_key_is_unique(pool: PgPool) {
    MachineRepo::create(&pool, &machine("5075E", 2019)).await.unwrap();
    MachineRepo::create(&pool, &machine("5075E", 2020)).await.unwrap();

    let err = MachineRepo::create(&pool, &machine("5075E", 2019))
        .await
        .unwrap_err();
    assert_eq!(constraint(err).as_deref(), Some("uq_machines_key"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_primary_engine_moves_between_links(pool: PgPool) {
    let tractor = MachineRepo::create(&pool, &machine("5075E", 2019)).await.unwrap().id;
    let qsb = engine(&pool, "QSB6.7").await;
    let isb = engine(&pool, "ISB5.9").await;

    MachineFitmentRepo::link_engine(&pool, tractor, &link_engine(qsb, true))
        .await
        .unwrap();
    let link = MachineFitmentRepo::link_engine(&pool, tractor, &link_engine(isb, true))
        .await
        .unwrap();
    assert!(link.is_primary);
    assert_eq!(link.engine_model, "ISB5.9");

    let engines = MachineFitmentRepo::engines_for_machine(&pool, tractor).await.unwrap();
    let flags: Vec<(DbId, bool)> = engines.iter().map(|l| (l.engine_id, l.is_primary)).collect();
    assert_eq!(flags, [(isb, true), (qsb, false)]);

    let machines = MachineFitmentRepo::machines_for_engine(&pool, qsb).await.unwrap();
    assert_eq!(machines.len(), 1);
    assert_eq!(machines[0].model, "5075E");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_links_hit_unique_constraints(pool: PgPool) {
    let tractor = MachineRepo::create(&pool, &machine("5075E", 2019)).await.unwrap().id;
    let qsb = engine(&pool, "QSB6.7").await;
    let filter = part(&pool, "LF-1").await;

    MachineFitmentRepo::link_engine(&pool, tractor, &link_engine(qsb, false))
        .await
        .unwrap();
    let err = MachineFitmentRepo::link_engine(&pool, tractor, &link_engine(qsb, false))
        .await
        .unwrap_err();
    assert_eq!(constraint(err).as_deref(), Some("uq_machine_engines_machine_engine"));

    MachineFitmentRepo::link_part(&pool, tractor, &link_part(filter))
        .await
        .unwrap();
    let err = MachineFitmentRepo::link_part(&pool, tractor, &link_part(filter))
        .await
        .unwrap_err();
    assert_eq!(constraint(err).as_deref(), Some("uq_machine_parts_machine_part"));

    EngineFitmentRepo::link_part(&pool, qsb, &link_part(filter))
        .await
        .unwrap();
    let err = EngineFitmentRepo::link_part(&pool, qsb, &link_part(filter))
        .await
        .unwrap_err();
    assert_eq!(constraint(err).as_deref(), Some("uq_engine_parts_engine_part"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_part_sees_machines_and_engines(pool: PgPool) {
    let tractor = MachineRepo::create(&pool, &machine("5075E", 2019)).await.unwrap().id;
    let qsb = engine(&pool, "QSB6.7").await;
    let filter = part(&pool, "LF-1").await;

    MachineFitmentRepo::link_part(&pool, tractor, &link_part(filter))
        .await
        .unwrap();
    let link = EngineFitmentRepo::link_part(&pool, qsb, &link_part(filter))
        .await
        .unwrap();
    assert_eq!(link.part_number, "LF-1");
    assert_eq!(link.notes.as_deref(), Some("OEM fit"));

    let machines = MachineFitmentRepo::machines_for_part(&pool, filter).await.unwrap();
    assert_eq!(machines[0].machine_id, tractor);
    let engines = EngineFitmentRepo::engines_for_part(&pool, filter).await.unwrap();
    assert_eq!(engines[0].engine_id, qsb);

    assert!(EngineFitmentRepo::unlink_part(&pool, qsb, filter).await.unwrap());
    assert!(!EngineFitmentRepo::unlink_part(&pool, qsb, filter).await.unwrap());
    assert!(EngineFitmentRepo::parts_for_engine(&pool, qsb).await.unwrap().is_empty());

    PartRepo::delete(&pool, filter).await.unwrap();
    assert!(MachineFitmentRepo::parts_for_machine(&pool, tractor)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_supersession_history_has_both_directions(pool: PgPool) {
    let old = engine(&pool, "6BT").await;
    let mid = engine(&pool, "ISB5.9").await;
    let new = engine(&pool, "QSB6.7").await;
    let date = NaiveDate::from_ymd_opt(2008, 1, 1);

    EngineFitmentRepo::create_supersession(&pool, old, mid, None, None)
        .await
        .unwrap();
    let record = EngineFitmentRepo::create_supersession(&pool, mid, new, Some("Tier 3"), date)
        .await
        .unwrap();
    assert_eq!(record.from_engine_model, "ISB5.9");
    assert_eq!(record.to_engine_model, "QSB6.7");
    assert_eq!(record.effective_date, date);

    let history = EngineFitmentRepo::supersessions(&pool, mid).await.unwrap();
    assert_eq!(history.supersedes.len(), 1);
    assert_eq!(history.supersedes[0].from_engine_id, old);
    assert_eq!(history.superseded_by.len(), 1);
    assert_eq!(history.superseded_by[0].to_engine_id, new);

    let err = EngineFitmentRepo::create_supersession(&pool, old, old, None, None)
        .await
        .unwrap_err();
    assert_matches!(err, sqlx::Error::Database(_));

    assert!(!EngineFitmentRepo::delete_supersession(&pool, old, record.id).await.unwrap());
    assert!(EngineFitmentRepo::delete_supersession(&pool, new, record.id).await.unwrap());
}
