//! Schema-driven populate: pull-parsing a wire buffer into a value tree.

use typed_json_schema::{Json, SchemaError, Value};

use crate::error::CodecError;
use crate::reader::{JsonReader, RootKind};

pub(crate) fn populate_root(json: &mut Json, reader: &mut JsonReader) -> Result<(), CodecError> {
    match reader.locate_first_token()? {
        RootKind::Object => {
            if !json.is_object() {
                return Err(SchemaError::NotAnObject.into());
            }
            populate_object(json, reader)
        }
        RootKind::Array => {
            if !json.is_array() {
                return Err(SchemaError::NotAnArray.into());
            }
            populate_array(json, reader)
        }
    }
}

/// Populates an object instance from the reader, which must be positioned
/// at the opening `{`. A wire property with no exposed counterpart in the
/// template is a hard error, never silently dropped.
fn populate_object(json: &mut Json, reader: &mut JsonReader) -> Result<(), CodecError> {
    let template = json.template().clone();
    let tobj = template.as_object().ok_or(SchemaError::NotAnObject)?;

    reader.expect(b'{')?;
    loop {
        let Some(name) = reader.goto_property()? else {
            return Ok(());
        };
        let index = tobj
            .exposed_index(&name)
            .ok_or(CodecError::PropertyNotFound { property: name })?;
        reader.goto_value()?;
        match json.value_mut(index) {
            Value::Bool(slot) => *slot = reader.read_bool()?,
            Value::Long(slot) => *slot = reader.read_long()?,
            Value::Double(slot) => *slot = reader.read_double()?,
            Value::Decimal(slot) => *slot = reader.read_decimal()?,
            Value::Str(slot) => *slot = reader.read_string()?,
            Value::Trigger => reader.read_trigger()?,
            Value::Object(child) => populate_object(child, reader)?,
            Value::Array(child) => populate_array(child, reader)?,
        }
    }
}

/// Populates an array instance: for each `{` yielded by the reader's
/// bounded iteration, append a new element and populate it, preserving wire
/// order.
fn populate_array(json: &mut Json, reader: &mut JsonReader) -> Result<(), CodecError> {
    reader.expect(b'[')?;
    while reader.goto_next_object()? {
        let mut sub = reader.create_sub_reader();
        let row = json.add_item()?;
        populate_object(row, &mut sub)?;
        reader.skip(sub.used())?;
    }
    Ok(())
}
