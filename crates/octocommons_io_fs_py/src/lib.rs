use std::collections::BTreeMap;

use octocommons_io_fs::{
    EnumZipCompression, ReportFsOp, SpecWriteOptions, SpecZipOptions, copy_tree, delete_tree,
    write_file, zip_tree_with_options,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "octocommons.fs.tree_ops.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ReportFsOp")]
#[derive(Debug, Clone)]
struct PyReportFsOp {
    inner: ReportFsOp,
}

impl From<ReportFsOp> for PyReportFsOp {
    fn from(report_fs_op: ReportFsOp) -> Self {
        Self {
            inner: report_fs_op,
        }
    }
}

#[pymethods]
impl PyReportFsOp {
    #[getter]
    fn succeeded(&self) -> Vec<String> {
        self.inner
            .succeeded
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect()
    }

    #[getter]
    fn failed(&self) -> Vec<String> {
        self.inner
            .failed
            .iter()
            .map(|path| path.to_string_lossy().to_string())
            .collect()
    }

    #[getter]
    fn message(&self) -> Option<String> {
        self.inner.message.clone()
    }

    #[getter]
    fn succeeded_count(&self) -> usize {
        self.inner.succeeded_count()
    }

    #[getter]
    fn failed_count(&self) -> usize {
        self.inner.failed_count()
    }

    fn to_dict(&self) -> BTreeMap<String, u64> {
        self.inner.to_dict()
    }

    #[pyo3(signature = (prefix = "[FS]"))]
    fn format(&self, prefix: &str) -> String {
        self.inner.format(prefix)
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }
}

fn parse_rule_compression(value: &str) -> PyResult<EnumZipCompression> {
    match value {
        "stored" => Ok(EnumZipCompression::Stored),
        "deflated" => Ok(EnumZipCompression::Deflated),
        _ => Err(PyValueError::new_err(format!(
            "Invalid compression: `{value}`. Expected one of: ['stored', 'deflated']"
        ))),
    }
}

#[pyfunction(name = "delete_tree")]
fn delete_tree_py(py: Python<'_>, path: String) -> PyReportFsOp {
    let report_del = py.allow_threads(|| delete_tree(path));
    PyReportFsOp::from(report_del)
}

#[pyfunction(name = "zip_tree")]
#[pyo3(signature = (archive_path, source_path, rule_compression = "deflated"))]
fn zip_tree_py(
    py: Python<'_>,
    archive_path: String,
    source_path: String,
    rule_compression: &str,
) -> PyResult<PyReportFsOp> {
    let spec_zip_options = SpecZipOptions {
        rule_compression: parse_rule_compression(rule_compression)?,
        ..SpecZipOptions::default()
    };

    let report_zip =
        py.allow_threads(|| zip_tree_with_options(archive_path, source_path, spec_zip_options));
    Ok(PyReportFsOp::from(report_zip))
}

#[pyfunction(name = "copy_tree")]
fn copy_tree_py(py: Python<'_>, source_path: String, target_path: String) {
    py.allow_threads(|| copy_tree(source_path, target_path));
}

#[pyfunction(name = "write_file")]
#[pyo3(signature = (path, content, if_overwrite = true, if_create_missing_parents = true))]
fn write_file_py(
    py: Python<'_>,
    path: String,
    content: Vec<u8>,
    if_overwrite: bool,
    if_create_missing_parents: bool,
) -> bool {
    let spec_write_options = SpecWriteOptions {
        if_overwrite,
        if_create_missing_parents,
    };
    py.allow_threads(|| write_file(path, &content, spec_write_options))
}

#[pymodule]
fn _octocommons_io_fs_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyReportFsOp>()?;
    module.add_function(wrap_pyfunction!(delete_tree_py, module)?)?;
    module.add_function(wrap_pyfunction!(zip_tree_py, module)?)?;
    module.add_function(wrap_pyfunction!(copy_tree_py, module)?)?;
    module.add_function(wrap_pyfunction!(write_file_py, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}

