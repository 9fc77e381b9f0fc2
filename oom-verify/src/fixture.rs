use chrono::{NaiveDate, NaiveDateTime};
use oom_data::{CalendarDateTime, Entity, Field};

/// Table every backend run creates and fills.
pub const TABLE: &str = "TESTER2";

/// The round-trip fixture: one generated key, one required text column, one
/// nullable integer and two timestamps with different in-memory types.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tester2 {
    pub id: i32,
    pub name: String,
    pub value: Option<i32>,
    pub time: Option<NaiveDateTime>,
    pub time2: Option<CalendarDateTime>,
}

impl Tester2 {
    /// The row inserted by every run.
    pub fn sample() -> Self {
        Tester2 {
            id: 0,
            name: "Hello".to_string(),
            value: Some(123),
            time: NaiveDate::from_ymd_opt(2014, 1, 30).and_then(|d| d.and_hms_opt(10, 42, 34)),
            time2: CalendarDateTime::new(2014, 1, 31, 11, 41, 32, 0).ok(),
        }
    }
}

impl Entity for Tester2 {
    type Id = i32;

    fn table_name() -> &'static str {
        TABLE
    }

    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::id("id", "ID", |t: &Tester2| &t.id, |t: &mut Tester2| &mut t.id).generated(),
            Field::column("name", "NAME", |t: &Tester2| &t.name, |t: &mut Tester2| &mut t.name)
                .length(20),
            Field::column("value", "VALUE", |t: &Tester2| &t.value, |t: &mut Tester2| &mut t.value),
            Field::column("time", "TIME", |t: &Tester2| &t.time, |t: &mut Tester2| &mut t.time),
            Field::column("time2", "TIME2", |t: &Tester2| &t.time2, |t: &mut Tester2| {
                &mut t.time2
            }),
        ]
    }

    fn id(&self) -> &i32 {
        &self.id
    }
}
