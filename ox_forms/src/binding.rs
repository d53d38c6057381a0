use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use log::{debug, info};
use ox_type_converter::converters::{is_truthy, value_to_date, value_to_flag, value_to_integer, value_to_tokens};
use ox_type_converter::TypeConverter;
use serde_json::{Map, Value};

use crate::mapping::FieldNameMap;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::state::{FormControl, FormState};
use crate::value::FieldValue;

/// Flat backend object for one saved profile.
pub type Record = Map<String, Value>;

/// Key under which a record carries its identifier.
pub const RECORD_ID_KEY: &str = "id";

/// Turns the raw record value of a field (if any) into its UI value.
pub type CoercionFn = fn(Option<&Value>, &FieldDescriptor) -> FieldValue;

lazy_static! {
    static ref COUNTRY_ORDINALS: HashMap<&'static str, i64> = {
        let mut m = HashMap::new();
        m.insert("india", 1);
        m.insert("usa", 2);
        m.insert("canada", 3);
        m
    };
}

const DEFAULT_COUNTRY: i64 = 1;

/// Per-field coercions that override the kind rule.
#[derive(Clone, Default)]
pub struct CoercionTable {
    entries: HashMap<String, CoercionFn>,
}

impl CoercionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strategies used by the profile form.
    pub fn profile() -> Self {
        let mut table = Self::new();
        table.register("gender", coerce_gender);
        table.register("country", coerce_country);
        table
    }

    pub fn register(&mut self, field: &str, coercion: CoercionFn) {
        self.entries.insert(field.to_string(), coercion);
    }

    pub fn get(&self, field: &str) -> Option<CoercionFn> {
        self.entries.get(field).copied()
    }

    /// Runs the field's registered strategy, or the rule for its kind.
    pub fn coerce(&self, raw: Option<&Value>, field: &FieldDescriptor) -> FieldValue {
        match self.get(&field.name) {
            Some(coercion) => coercion(raw, field),
            None => coerce_by_kind(raw, field),
        }
    }
}

/// `"male"` (any case, trimmed) is true, any other string false, everything else by truthiness.
/// A missing gender is false, whatever the schema default says.
pub fn coerce_gender(raw: Option<&Value>, _field: &FieldDescriptor) -> FieldValue {
    match raw {
        Some(Value::String(s)) => FieldValue::Bool(s.trim().eq_ignore_ascii_case("male")),
        _ => FieldValue::Bool(raw.map_or(false, is_truthy)),
    }
}

/// Country names map to a fixed ordinal; numeric input passes through.
pub fn coerce_country(raw: Option<&Value>, _field: &FieldDescriptor) -> FieldValue {
    let ordinal = match raw {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => {
            let key = s.trim().to_lowercase();
            COUNTRY_ORDINALS
                .get(key.as_str())
                .copied()
                .or_else(|| key.parse::<i64>().ok())
        }
        _ => None,
    };
    FieldValue::Integer(ordinal.unwrap_or(DEFAULT_COUNTRY))
}

/// Kind-driven coercion of a record value.
pub fn coerce_by_kind(raw: Option<&Value>, field: &FieldDescriptor) -> FieldValue {
    let present = raw.filter(|v| !v.is_null());
    match field.kind {
        // Missing or unparseable dates stay empty; "today" is only a submit-time default.
        FieldKind::Date => present
            .and_then(value_to_date)
            .map(FieldValue::Date)
            .unwrap_or_else(FieldValue::empty),
        FieldKind::Multiselect => FieldValue::List(present.map(value_to_tokens).unwrap_or_default()),
        FieldKind::Checkbox => FieldValue::Bool(present.map(value_to_flag).unwrap_or(false)),
        FieldKind::Number => FieldValue::Integer(present.and_then(|v| value_to_integer(v).ok()).unwrap_or(0)),
        _ => match present {
            Some(value) => FieldValue::from_json(value),
            None => fallback(field),
        },
    }
}

fn fallback(field: &FieldDescriptor) -> FieldValue {
    field.default_or_none().map(FieldValue::from_json).unwrap_or_default()
}

/// Finds the record whose identifier matches `id`, comparing loosely so that
/// `7` and `"7"` are the same identifier.
pub fn find_record<'a>(records: &'a [Record], id: &Value) -> Option<&'a Record> {
    records.iter().find(|record| {
        record
            .get(RECORD_ID_KEY)
            .map_or(false, |candidate| TypeConverter::loosely_equal(candidate, id))
    })
}

/// Builds form state from a schema, empty or pre-populated from a record.
#[derive(Clone)]
pub struct FormSynthesizer {
    fields: Arc<[FieldDescriptor]>,
    names: FieldNameMap,
    coercions: CoercionTable,
}

impl FormSynthesizer {
    pub fn new(fields: Arc<[FieldDescriptor]>, names: FieldNameMap, coercions: CoercionTable) -> Self {
        Self { fields, names, coercions }
    }

    /// Synthesizer wired with the profile name mapping and coercions.
    pub fn profile(fields: Arc<[FieldDescriptor]>) -> Self {
        let names = FieldNameMap::profile(&fields);
        Self::new(fields, names, CoercionTable::profile())
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn names(&self) -> &FieldNameMap {
        &self.names
    }

    /// Every field starts at its default value, or empty.
    pub fn build_empty(&self) -> FormState {
        let controls = self
            .fields
            .iter()
            .map(|field| FormControl::new(field.clone(), fallback(field)))
            .collect();
        FormState::new(controls)
    }

    /// Pre-populates from `record`, or builds an empty form when there is none.
    pub fn build_from_record(&self, record: Option<&Record>) -> FormState {
        let Some(record) = record else {
            debug!("No record supplied, building an empty form");
            return self.build_empty();
        };

        let controls = self
            .fields
            .iter()
            .map(|field| {
                let raw = record.get(self.names.record_key(&field.name));
                FormControl::new(field.clone(), self.coercions.coerce(raw, field))
            })
            .collect();
        FormState::new(controls)
    }

    /// Looks the record up by identifier. Not finding it is not an error.
    pub fn build_for_id(&self, records: &[Record], id: &Value) -> FormState {
        let record = find_record(records, id);
        if record.is_none() {
            info!("No record with id {} among {} records, using an empty form", id, records.len());
        }
        self.build_from_record(record)
    }
}
