use chrono::{NaiveDate, NaiveDateTime};
use oom_data::{CalendarDateTime, DataError, Dialect, Entity, EntityMapper, Field};
use oom_data_sqlx::{DbPool, OomQuery, PoolSettings};

const DDL: &str = "CREATE TABLE SAMPLES (\
    ID INTEGER PRIMARY KEY AUTOINCREMENT, \
    NAME VARCHAR(20) NOT NULL, \
    VALUE INTEGER, \
    TIME TIMESTAMP, \
    TIME2 TIMESTAMP)";

#[derive(Debug, Default, Clone, PartialEq)]
struct Sample {
    id: i32,
    name: String,
    value: Option<i32>,
    time: Option<NaiveDateTime>,
    time2: Option<CalendarDateTime>,
}

impl Entity for Sample {
    type Id = i32;

    fn table_name() -> &'static str {
        "SAMPLES"
    }

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::id("id", "ID", |s: &Sample| &s.id, |s: &mut Sample| &mut s.id).generated(),
            Field::column("name", "NAME", |s: &Sample| &s.name, |s: &mut Sample| &mut s.name)
                .length(20),
            Field::column("value", "VALUE", |s: &Sample| &s.value, |s: &mut Sample| &mut s.value),
            Field::column("time", "TIME", |s: &Sample| &s.time, |s: &mut Sample| &mut s.time),
            Field::column("time2", "TIME2", |s: &Sample| &s.time2, |s: &mut Sample| &mut s.time2),
        ]
    }

    fn id(&self) -> &i32 {
        &self.id
    }
}

fn sample() -> Sample {
    Sample {
        id: 0,
        name: "Hello".into(),
        value: Some(123),
        time: NaiveDate::from_ymd_opt(2014, 1, 30)
            .unwrap()
            .and_hms_opt(10, 42, 34),
        time2: Some(CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 0).unwrap()),
    }
}

async fn setup() -> (DbPool, EntityMapper) {
    let pool = DbPool::connect(Dialect::Sqlite, "sqlite::memory:", &PoolSettings::default())
        .await
        .unwrap();
    let mut session = pool.open_session().await.unwrap();
    session.execute_ddl(DDL).await.unwrap();
    session.close();

    let mut mapper = EntityMapper::new(Dialect::Sqlite);
    mapper.register::<Sample>().unwrap();
    (pool, mapper)
}

#[tokio::test]
async fn test_insert_assigns_generated_key() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    let mut first = sample();
    assert_eq!(query.insert(&mut first).await.unwrap(), 1);
    assert_eq!(first.id, 1);

    let mut second = sample();
    query.insert(&mut second).await.unwrap();
    assert_eq!(second.id, 2);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_skipped_insert_leaves_key_unassigned() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();

    let mut first = sample();
    OomQuery::new(&mut session, &mapper)
        .unwrap()
        .insert(&mut first)
        .await
        .unwrap();
    assert_eq!(first.id, 1);

    session
        .execute_ddl("CREATE TRIGGER SAMPLES_SKIP BEFORE INSERT ON SAMPLES BEGIN SELECT RAISE(IGNORE); END;")
        .await
        .unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();
    let mut second = sample();
    assert_eq!(query.insert(&mut second).await.unwrap(), 0);
    assert_eq!(second.id, 0);
    assert_eq!(query.count::<Sample>().await.unwrap(), 1);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_round_trip_preserves_every_field() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    let mut inserted = sample();
    query.insert(&mut inserted).await.unwrap();
    let loaded = query.find_by_id::<Sample>(&inserted.id).await.unwrap().unwrap();
    assert_eq!(loaded, inserted);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_round_trip_keeps_nulls() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    let mut inserted = Sample {
        value: None,
        time: None,
        time2: None,
        ..sample()
    };
    query.insert(&mut inserted).await.unwrap();
    let loaded = query.find_by_id::<Sample>(&inserted.id).await.unwrap().unwrap();
    assert_eq!(loaded.value, None);
    assert_eq!(loaded.time, None);
    assert_eq!(loaded.time2, None);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_round_trip_keeps_milliseconds() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    let mut inserted = Sample {
        time2: Some(CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 250).unwrap()),
        ..sample()
    };
    query.insert(&mut inserted).await.unwrap();
    let loaded = query.find_by_id::<Sample>(&inserted.id).await.unwrap().unwrap();
    assert_eq!(loaded.time2.unwrap().millisecond(), 250);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_find_missing_id_returns_none() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    assert!(query.find_by_id::<Sample>(&42).await.unwrap().is_none());
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_count() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    assert_eq!(query.count::<Sample>().await.unwrap(), 0);
    query.insert(&mut sample()).await.unwrap();
    assert_eq!(query.count::<Sample>().await.unwrap(), 1);
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_rows_survive_session_close() {
    let (pool, mapper) = setup().await;
    let mut entity = sample();
    {
        let mut session = pool.open_session().await.unwrap();
        let mut query = OomQuery::new(&mut session, &mapper).unwrap();
        query.insert(&mut entity).await.unwrap();
        session.close();
    }

    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();
    assert!(query.find_by_id::<Sample>(&entity.id).await.unwrap().is_some());
    session.close();
    pool.close().await;
    assert!(pool.is_closed());
}

#[tokio::test]
async fn test_dialect_mismatch_is_rejected() {
    let (pool, _) = setup().await;
    let mut mapper = EntityMapper::new(Dialect::MySql);
    mapper.register::<Sample>().unwrap();
    let mut session = pool.open_session().await.unwrap();
    assert!(matches!(
        OomQuery::new(&mut session, &mapper),
        Err(DataError::Mapping(_))
    ));
    session.close();
    pool.close().await;
}

#[tokio::test]
async fn test_hsqldb_has_no_driver() {
    let err = DbPool::connect(Dialect::HsqlDb, "jdbc:hsqldb:mem:test", &PoolSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DataError::UnsupportedBackend(_)));
}

#[tokio::test]
async fn test_overlong_name_is_rejected_before_reaching_the_store() {
    let (pool, mapper) = setup().await;
    let mut session = pool.open_session().await.unwrap();
    let mut query = OomQuery::new(&mut session, &mapper).unwrap();

    let mut entity = Sample {
        name: "x".repeat(21),
        ..sample()
    };
    assert!(query.insert(&mut entity).await.is_err());
    assert_eq!(query.count::<Sample>().await.unwrap(), 0);
    session.close();
    pool.close().await;
}
