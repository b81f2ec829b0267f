//! Two-phase size estimator / serializer and the populate entry point.
//!
//! `estimate` computes a conservative upper bound for a tree; `serialize`
//! performs the exact write into a buffer of that size. The bound is a hard
//! contract: a write that does not fit is an internal-invariant failure
//! ([`CodecError::Capacity`]), because the estimate reserved too little.
//!
//! Dispatch is a single match over the value slot's kind, so supporting a
//! new scalar kind is one new arm in `estimate_value` and one in
//! `serialize_value`.

use typed_json_buffers::Writer;
use typed_json_schema::{Json, SchemaError, Session, SiblingSet, Value};

use crate::error::CodecError;
use crate::merge;
use crate::populate;
use crate::reader::JsonReader;
use crate::scalars;
use crate::settings::SerializerSettings;

/// Session context of one serialization pass over a root tree.
#[derive(Debug, Clone, Copy)]
pub struct SerializeContext<'a> {
    pub session: &'a Session,
    pub siblings: Option<&'a SiblingSet<'a>>,
}

impl<'a> SerializeContext<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            siblings: None,
        }
    }

    pub fn with_siblings(session: &'a Session, siblings: &'a SiblingSet<'a>) -> Self {
        Self {
            session,
            siblings: Some(siblings),
        }
    }
}

/// Schema-tag-dispatched size estimator and serializer.
#[derive(Debug, Default)]
pub struct JsonSerializer {
    settings: SerializerSettings,
}

impl JsonSerializer {
    pub fn new() -> Self {
        Self {
            settings: SerializerSettings::default(),
        }
    }

    pub fn with_settings(settings: SerializerSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &SerializerSettings {
        &self.settings
    }

    /// Conservative upper bound on the encoded size of `json`.
    pub fn estimate(
        &self,
        json: &Json,
        ctx: Option<&SerializeContext>,
    ) -> Result<usize, CodecError> {
        let size = self.estimate_instance(json, ctx, false)?;
        self.check_ceiling(size)?;
        log::trace!("estimated tree {} at {} bytes", json.tree_id(), size);
        Ok(size)
    }

    /// Writes `json` into `dest` and returns the number of bytes written.
    /// Never writes more than `estimate` reserved for the same tree.
    pub fn serialize(
        &self,
        json: &Json,
        dest: &mut [u8],
        ctx: Option<&SerializeContext>,
    ) -> Result<usize, CodecError> {
        let mut writer = Writer::new(dest);
        self.serialize_instance(json, &mut writer, ctx, false)?;
        log::trace!(
            "serialized tree {} into {} bytes",
            json.tree_id(),
            writer.pos()
        );
        Ok(writer.pos())
    }

    /// The two-phase protocol in one call: estimate, allocate, serialize,
    /// truncate.
    pub fn to_bytes(
        &self,
        json: &Json,
        ctx: Option<&SerializeContext>,
    ) -> Result<Vec<u8>, CodecError> {
        let estimated = self.estimate(json, ctx)?;
        let mut buf = vec![0u8; estimated];
        let written = self.serialize(json, &mut buf, ctx)?;
        debug_assert!(
            written <= estimated,
            "estimate undercounted: wrote {written} of {estimated}"
        );
        buf.truncate(written);
        Ok(buf)
    }

    /// Pull-parses `input` into the tree and returns the number of bytes
    /// consumed. The caller must hold exclusive access to the tree for the
    /// duration of the call.
    pub fn populate(&self, json: &mut Json, input: &[u8]) -> Result<usize, CodecError> {
        let mut reader = JsonReader::new(input);
        populate::populate_root(json, &mut reader)?;
        Ok(reader.used())
    }

    fn check_ceiling(&self, size: usize) -> Result<(), CodecError> {
        if size > self.settings.max_estimated_size {
            return Err(CodecError::EstimateTooLarge {
                estimated: size,
                max: self.settings.max_estimated_size,
            });
        }
        Ok(())
    }

    // ----------------------------------------------------------------
    // Estimate

    fn estimate_instance(
        &self,
        json: &Json,
        ctx: Option<&SerializeContext>,
        from_sibling: bool,
    ) -> Result<usize, CodecError> {
        if json.is_array() {
            self.estimate_array(json, ctx)
        } else {
            self.estimate_object(json, ctx, from_sibling)
        }
    }

    fn estimate_value(
        &self,
        value: &Value,
        ctx: Option<&SerializeContext>,
    ) -> Result<usize, CodecError> {
        Ok(match value {
            Value::Bool(_) => 5,
            Value::Long(_) | Value::Double(_) | Value::Decimal(_) => 32,
            Value::Trigger => 4,
            Value::Str(s) => scalars::string_capacity(s.as_deref()),
            Value::Object(child) => self.estimate_object(child, ctx, false)?,
            Value::Array(child) => self.estimate_array(child, ctx)?,
        })
    }

    fn estimate_object(
        &self,
        json: &Json,
        ctx: Option<&SerializeContext>,
        from_sibling: bool,
    ) -> Result<usize, CodecError> {
        let wrap = merge::namespaced_siblings(json, ctx, from_sibling);
        let mut size = 1usize; // {

        if let Some(ctx) = ctx {
            if ctx.session.is_public_root(json) {
                if let Some(version) = ctx.session.version() {
                    size += version.remote_version_property_name.len() + 35;
                    size += version.local_version_property_name.len() + 35;
                }
            }
        }

        let tobj = json
            .template()
            .as_object()
            .ok_or(SchemaError::NotAnObject)?;
        for (index, template) in tobj.exposed_properties() {
            size += template.name().len() + 3; // quotes and colon
            size += self.estimate_value(json.value(index), ctx)?;
            size += 1; // separator
        }

        if let Some(siblings) = wrap {
            let app_name = json.app_name().unwrap_or("");
            size += app_name.len() + 5; // quotes, colon, inner braces
            for sibling in siblings {
                if sibling.tree.tree_id() == json.tree_id() {
                    continue;
                }
                size += sibling.app_name.len() + 3;
                size += self.estimate_instance(sibling.tree, ctx, true)? + 1;
            }
            let url = merge::merge_html_url(&self.settings.merge_endpoint, siblings);
            size += 8 + scalars::string_capacity(Some(&url)); // ,"Html":
        }

        size += 1; // }
        Ok(size)
    }

    fn estimate_array(
        &self,
        json: &Json,
        ctx: Option<&SerializeContext>,
    ) -> Result<usize, CodecError> {
        let mut size = 2usize; // []
        for item in json.items() {
            size += self.estimate_instance(item, ctx, false)? + 1;
            self.check_ceiling(size)?;
        }
        Ok(size)
    }

    // ----------------------------------------------------------------
    // Serialize

    fn serialize_instance(
        &self,
        json: &Json,
        w: &mut Writer,
        ctx: Option<&SerializeContext>,
        from_sibling: bool,
    ) -> Result<(), CodecError> {
        if json.is_array() {
            self.serialize_array(json, w, ctx)
        } else {
            self.serialize_object(json, w, ctx, from_sibling)
        }
    }

    fn serialize_value(
        &self,
        value: &Value,
        w: &mut Writer,
        ctx: Option<&SerializeContext>,
    ) -> Result<(), CodecError> {
        match value {
            Value::Bool(v) => scalars::write_bool(w, *v),
            Value::Long(v) => scalars::write_long(w, *v),
            Value::Double(v) => scalars::write_double(w, *v),
            Value::Decimal(v) => scalars::write_decimal(w, *v),
            Value::Str(v) => scalars::write_string(w, v.as_deref()),
            Value::Trigger => scalars::write_null(w),
            Value::Object(child) => self.serialize_object(child, w, ctx, false),
            Value::Array(child) => self.serialize_array(child, w, ctx),
        }
    }

    fn serialize_object(
        &self,
        json: &Json,
        w: &mut Writer,
        ctx: Option<&SerializeContext>,
        from_sibling: bool,
    ) -> Result<(), CodecError> {
        let wrap = merge::namespaced_siblings(json, ctx, from_sibling);
        w.u8(b'{')?;

        if wrap.is_some() {
            let app_name = json.app_name().unwrap_or("");
            log::debug!(
                "wrapping tree {} under application \"{}\"",
                json.tree_id(),
                app_name
            );
            scalars::write_string_as_is(w, app_name)?;
            w.u8(b':')?;
            w.u8(b'{')?;
        }

        let mut first = true;

        if let Some(ctx) = ctx {
            if ctx.session.is_public_root(json) {
                if let Some(version) = ctx.session.version() {
                    scalars::write_string_as_is(w, &version.remote_version_property_name)?;
                    w.u8(b':')?;
                    scalars::write_long(w, version.remote_version)?;
                    w.u8(b',')?;
                    scalars::write_string_as_is(w, &version.local_version_property_name)?;
                    w.u8(b':')?;
                    scalars::write_long(w, version.local_version)?;
                    first = false;
                }
            }
        }

        let tobj = json
            .template()
            .as_object()
            .ok_or(SchemaError::NotAnObject)?;
        for (index, template) in tobj.exposed_properties() {
            if !first {
                w.u8(b',')?;
            }
            scalars::write_string_as_is(w, template.name())?;
            w.u8(b':')?;
            self.serialize_value(json.value(index), w, ctx)?;
            first = false;
        }

        if let Some(siblings) = wrap {
            w.u8(b'}')?;
            log::debug!(
                "embedding {} sibling view models next to tree {}",
                siblings.len() - 1,
                json.tree_id()
            );
            for sibling in siblings {
                if sibling.tree.tree_id() == json.tree_id() {
                    continue;
                }
                w.u8(b',')?;
                scalars::write_string_as_is(w, sibling.app_name)?;
                w.u8(b':')?;
                self.serialize_instance(sibling.tree, w, ctx, true)?;
            }
            let url = merge::merge_html_url(&self.settings.merge_endpoint, siblings);
            w.u8(b',')?;
            scalars::write_string_as_is(w, "Html")?;
            w.u8(b':')?;
            scalars::write_string(w, Some(&url))?;
        }

        w.u8(b'}')?;
        Ok(())
    }

    fn serialize_array(
        &self,
        json: &Json,
        w: &mut Writer,
        ctx: Option<&SerializeContext>,
    ) -> Result<(), CodecError> {
        w.u8(b'[')?;
        let items = json.items();
        for (i, item) in items.iter().enumerate() {
            self.serialize_instance(item, w, ctx, false)?;
            if i + 1 < items.len() {
                w.u8(b',')?;
            }
        }
        w.u8(b']')?;
        Ok(())
    }
}
