//! The two-pass pipeline: collect references, resolve, emit.

use quill_core::{LexicalPolicy, RenderConfig, Result};

use crate::{CodeWriter, ImportRequest, ImportTable, resolve_imports};

/// A root node that renders to one output file.
pub trait SourceFile {
    /// Package the file's declarations live in; may be empty.
    fn package(&self) -> &str;

    /// Imports the caller asked for, honored ahead of collected ones.
    fn import_requests(&self) -> Vec<ImportRequest> {
        Vec::new()
    }

    /// Settings for this file, given the caller's base configuration.
    fn render_config(&self, base: RenderConfig) -> RenderConfig {
        base
    }

    /// Write the whole file. Called once per pass, so it must not depend
    /// on anything but the tree and the writer.
    fn emit(&self, writer: &mut CodeWriter) -> Result<()>;
}

/// Render `file` to a string.
///
/// The first pass emits into a discarded buffer to collect every type and
/// member reference. The second pass emits with the resolved import table.
/// Any error aborts the render and no partial output is returned.
#[tracing::instrument(level = "debug", skip_all, fields(package = file.package()))]
pub fn render_source(
    file: &dyn SourceFile,
    config: RenderConfig,
    policy: &LexicalPolicy,
) -> Result<String> {
    let config = file.render_config(config);
    config.validate()?;

    let explicit = ImportTable::from_requests(&file.import_requests())?;

    let mut collector = CodeWriter::collecting(config, *policy, explicit.clone());
    file.emit(&mut collector)?;
    let collected = collector.into_collected()?;
    tracing::debug!(
        types = collected.type_count(),
        members = collected.member_count(),
        referenced_types = collected.referenced_types.len(),
        referenced_members = collected.referenced_members.len(),
        "collected references"
    );

    let imports = resolve_imports(&collected, explicit, policy);

    let mut writer = CodeWriter::new(config, *policy, imports);
    file.emit(&mut writer)?;
    writer.finish()
}

#[cfg(test)]
mod tests {
    use quill_core::{ClassName, Error, PLAIN};

    use super::*;
    use crate::Arg;

    struct Script {
        package: &'static str,
        requests: Vec<ImportRequest>,
        body: Vec<(&'static str, Vec<Arg>)>,
    }

    impl SourceFile for Script {
        fn package(&self) -> &str {
            self.package
        }

        fn import_requests(&self) -> Vec<ImportRequest> {
            self.requests.clone()
        }

        fn emit(&self, writer: &mut CodeWriter) -> Result<()> {
            writer.push_package(self.package)?;
            let imports = writer.imports().render(writer.policy())?;
            for import in &imports {
                writer.emit_format("import %L\n", &[Arg::from(import)])?;
            }
            if !imports.is_empty() {
                writer.emit("\n")?;
            }
            for (template, args) in &self.body {
                writer.emit_format(template, args)?;
            }
            writer.pop_package();
            Ok(())
        }
    }

    #[test]
    fn test_two_dates() {
        let script = Script {
            package: "com.example",
            requests: Vec::new(),
            body: vec![(
                "val a = %T()\nval b = %T()\n",
                vec![
                    Arg::from(ClassName::new("java.util", "Date")),
                    Arg::from(ClassName::new("java.sql", "Date")),
                ],
            )],
        };
        let out = render_source(&script, RenderConfig::default(), &PLAIN).unwrap();
        assert_eq!(
            out,
            "import java.util.Date\n\nval a = Date()\nval b = java.sql.Date()\n"
        );
    }

    #[test]
    fn test_conflicting_requests_produce_no_output() {
        let script = Script {
            package: "com.example",
            requests: vec![
                ImportRequest::new(ClassName::new("java.util", "Date")),
                ImportRequest::new(ClassName::new("java.sql", "Date")),
            ],
            body: Vec::new(),
        };
        let err = render_source(&script, RenderConfig::default(), &PLAIN).unwrap_err();
        assert!(matches!(*err, Error::ImportConflict { .. }));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let script = Script {
            package: "",
            requests: Vec::new(),
            body: Vec::new(),
        };
        let config = RenderConfig::default().with_column_limit(1);
        let err = render_source(&script, config, &PLAIN).unwrap_err();
        assert!(matches!(*err, Error::InvalidConfig { .. }));
    }
}
