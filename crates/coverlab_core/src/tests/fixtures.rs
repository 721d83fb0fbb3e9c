//! Scratch harness roots with fake engines.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::config::HarnessConfig;
use crate::model::{ParamValue, ParameterSpace, SweepSchema};

/// Parses the query flags and writes a two-trial report whose `t2` echoes the delta.
pub const ECHO_ENGINE: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -a) geom="$2"; shift 2 ;;
    -s) archive="$2"; shift 2 ;;
    -d) delta="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
[ -f "$geom" ] || { echo "missing geometry $geom" >&2; exit 2; }
[ -f "$archive" ] || { echo "missing archive $archive" >&2; exit 2; }
printf '[{"t1": 1, "t2": %s}, {"t1": 3, "t2": %s}]' "$delta" "$delta" > "$out"
"#;

/// Writes a sectioned report regardless of arguments.
pub const SECTIONED_ENGINE: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf '{"discrete": [{"x": 1}, {"x": 3}], "continuous": [{"x": 10}]}' > "$out"
"#;

/// Exits without writing anything.
pub const CRASHING_ENGINE: &str = "#!/bin/sh\necho 'segmentation fault' >&2\nexit 139\n";

/// Writes garbage.
pub const GARBAGE_ENGINE: &str = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
printf 'not json' > "$out"
"#;

pub const SLEEPING_ENGINE: &str = "#!/bin/sh\nexec sleep 10\n";

/// A temporary harness root with an engine and a `1000` archive.
pub struct Lab {
    _dir: TempDir,
    pub config: HarnessConfig,
}

impl Lab {
    pub fn new(engine: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HarnessConfig::with_root(dir.path());
        config.persist = false;
        config.export_series = false;

        write_executable(&config.engine_path(), engine);
        let archives = config.archives_path();
        fs::create_dir_all(&archives).unwrap();
        fs::write(archives.join("1000.csv"), "id,price\n1,2.0\n").unwrap();

        Self { _dir: dir, config }
    }

    pub fn with_schema(engine: &str, schema: SweepSchema) -> Self {
        let mut lab = Self::new(engine);
        lab.config.schema = schema;
        lab
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn report_path(&self, tag: &str) -> PathBuf {
        self.config.results_path().join(format!("{tag}.json"))
    }
}

pub fn write_executable(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// Query space sweeping `delta` over `deltas`.
pub fn delta_space(deltas: &[f64]) -> ParameterSpace {
    ParameterSpace::new([
        (
            "delta",
            deltas.iter().copied().map(ParamValue::Float).collect(),
        ),
        ("n_regions", vec![ParamValue::Int(3)]),
        ("region_size", vec![ParamValue::Float(0.25)]),
        ("archive_size", vec![ParamValue::Int(1000)]),
    ])
    .unwrap()
}
