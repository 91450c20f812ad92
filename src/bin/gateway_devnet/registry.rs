use std::collections::BTreeMap;

use serde::Serialize;

use super::*;

#[derive(Clone, Debug, Serialize)]
pub(super) struct HeadCell {
    pub(super) uuid: String,
    pub(super) value: String,
    #[serde(rename = "type_")]
    pub(super) ty: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub(super) enum CellValue {
    String(String),
    Number(serde_json::Number),
    Boolean(bool),
    Null,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct RowCell {
    pub(super) uuid: String,
    pub(super) value: CellValue,
}

#[derive(Clone, Debug, Serialize)]
pub(super) struct Registry {
    pub(super) uuid: String,
    pub(super) owner: AccountId,
    pub(super) name: String,
    pub(super) columns: Vec<HeadCell>,
    pub(super) rows: Vec<BTreeMap<String, RowCell>>,
}

#[derive(Clone, Debug)]
pub(super) struct RegistryContract {
    greeting: String,
    registries: Vec<Registry>,
    // Every created cell takes the next number.
    cells_counter: u64,
}

impl RegistryContract {
    pub(super) fn new(greeting: String) -> Self {
        Self {
            greeting,
            registries: Vec::new(),
            cells_counter: 0,
        }
    }

    pub(super) fn view(&self, method: &str, _args: &Value) -> Result<Value, String> {
        match method {
            "get" => Ok(Value::String(self.greeting.clone())),
            "get_all_registries" => {
                serde_json::to_value(&self.registries).map_err(|e| e.to_string())
            }
            "get_cells_count" => Ok(Value::from(self.cells_counter)),
            other => Err(format!("method {} not found", other)),
        }
    }

    pub(super) fn call(
        &mut self,
        _signer: &AccountId,
        method: &str,
        args: &Value,
    ) -> Result<Value, String> {
        match method {
            "new_registry" => self.new_registry(args).map(|_| Value::Null),
            other => Err(format!("method {} not found", other)),
        }
    }

    fn new_registry(&mut self, args: &Value) -> Result<(), String> {
        let owner: AccountId = args
            .get("owner_id")
            .and_then(Value::as_str)
            .ok_or("missing owner_id")?
            .parse()
            .map_err(|e: registry_gateway::model::CallError| e.message)?;
        let name = args
            .get("name")
            .and_then(Value::as_str)
            .ok_or("missing name")?
            .to_string();
        if self.registries.iter().any(|r| r.name == name) {
            return Err("Name already exists".to_string());
        }
        let columns = args
            .get("columns")
            .and_then(Value::as_array)
            .ok_or("columns must be an array")?;
        let rows = args
            .get("rows")
            .and_then(Value::as_array)
            .ok_or("rows must be an array")?;

        // Build on a copy of the counter so a bad cell leaves state untouched.
        let mut counter = self.cells_counter;
        let mut next_uuid = |seed: &str| {
            let n = counter;
            counter += 1;
            cell_uuid(&format!("{}:{}:{}", name, seed, n))
        };

        let mut head = Vec::with_capacity(columns.len());
        for column in columns {
            let value = column
                .get("value")
                .and_then(Value::as_str)
                .ok_or("column cell needs a string value")?;
            let ty = column
                .get("type")
                .and_then(Value::as_str)
                .ok_or("column cell needs a string type")?;
            head.push(HeadCell {
                uuid: next_uuid(value),
                value: value.to_string(),
                ty: ty.to_string(),
            });
        }

        let mut body = Vec::with_capacity(rows.len());
        for row in rows {
            let row = row.as_object().ok_or("row should be an object")?;
            let mut cells = BTreeMap::new();
            for (key, cell) in row {
                let value = match cell.get("value") {
                    Some(Value::String(s)) => CellValue::String(s.clone()),
                    Some(Value::Number(n)) => CellValue::Number(n.clone()),
                    Some(Value::Bool(b)) => CellValue::Boolean(*b),
                    Some(Value::Null) | None => CellValue::Null,
                    Some(_) => return Err(format!("unsupported value in cell {}", key)),
                };
                cells.insert(
                    key.clone(),
                    RowCell {
                        uuid: next_uuid(key),
                        value,
                    },
                );
            }
            body.push(cells);
        }

        self.cells_counter = counter;
        self.registries.push(Registry {
            uuid: cell_uuid(&name),
            owner,
            name,
            columns: head,
            rows: body,
        });
        Ok(())
    }
}

fn cell_uuid(seed: &str) -> String {
    let hex = blake3::hash(seed.as_bytes()).to_hex();
    let s = hex.as_str();
    format!("{}-{}-{}-{}-{}", &s[0..8], &s[8..12], &s[12..16], &s[16..20], &s[20..32])
}
