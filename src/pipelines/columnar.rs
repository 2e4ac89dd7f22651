// Copyright 2021-present, the HIT-SCIR LTP team, Harbin Institute of Technology.
// Copyright 2019 Guillaume Becquin
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//     http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Columnar (Apache Arrow) export of the pipeline results
//! Each annotation layer becomes a list array with one entry per sentence:
//!
//! | column | type |
//! |--------|------|
//! | `seg`, `pos`, `ner` | `List<Utf8>` |
//! | `srl` | `List<List<Utf8>>` |
//! | `dep` | `List<Struct{arc: UInt64, rel: Utf8}>` |
//! | `sdp` | `List<Struct{src: UInt64, tgt: UInt64, rel: Utf8}>` |
//!
//! Layers the loaded model does not provide are null for every row.
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use arrow::array::{ArrayRef, StringArray};
//! use ltp::pipelines::columnar::record_batch_to_map;
//! use ltp::pipelines::ltp::LTPModel;
//! use std::sync::Arc;
//!
//! let mut ltp = LTPModel::new("path/to/ltp/model")?;
//! let sentences: ArrayRef = Arc::new(StringArray::from(vec!["他叫汤姆去拿外衣！", "我爱赛尔！"]));
//! let batch = ltp.pipeline_record_batch(sentences)?;
//! let columns = record_batch_to_map(&batch)?;
//! assert_eq!(columns["seg"].len(), 2);
//! # Ok(())
//! # }
//! ```

use crate::common::error::LTPError;
use crate::pipelines::ltp::{Dependency, LTPModel, LTPResult, SemanticDependency};
use crate::pipelines::onnx::ModelBackend;
use crate::pipelines::vocabs::Task;
use arrow::array::{
    Array, ArrayRef, ListArray, ListBuilder, StringArray, StringBuilder, StructArray,
    StructBuilder, UInt64Array, UInt64Builder,
};
use arrow::datatypes::{DataType, Field, Fields, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::collections::BTreeMap;
use std::sync::Arc;

fn dep_fields() -> Fields {
    Fields::from(vec![
        Field::new("arc", DataType::UInt64, false),
        Field::new("rel", DataType::Utf8, false),
    ])
}

fn sdp_fields() -> Fields {
    Fields::from(vec![
        Field::new("src", DataType::UInt64, false),
        Field::new("tgt", DataType::UInt64, false),
        Field::new("rel", DataType::Utf8, false),
    ])
}

fn list_of(data_type: DataType) -> DataType {
    DataType::List(Arc::new(Field::new_list_field(data_type, true)))
}

/// Schema of the record batches built from pipeline results.
pub fn ltp_result_schema() -> SchemaRef {
    let column_type = |task: Task| match task {
        Task::Seg | Task::Pos | Task::Ner => list_of(DataType::Utf8),
        Task::Srl => list_of(list_of(DataType::Utf8)),
        Task::Dep => list_of(DataType::Struct(dep_fields())),
        Task::Sdp => list_of(DataType::Struct(sdp_fields())),
    };
    Arc::new(Schema::new(
        Task::ALL
            .iter()
            .map(|task| Field::new(task.name(), column_type(*task), true))
            .collect::<Vec<Field>>(),
    ))
}

fn missing_field(name: &str) -> LTPError {
    LTPError::ArrowError(format!("struct builder has no `{name}` field"))
}

fn string_lists<'a, F>(results: &'a [LTPResult], layer: F) -> ArrayRef
where
    F: Fn(&'a LTPResult) -> Option<&'a Vec<String>>,
{
    let mut builder = ListBuilder::new(StringBuilder::new());
    for result in results {
        match layer(result) {
            Some(values) => {
                for value in values {
                    builder.values().append_value(value);
                }
                builder.append(true);
            }
            None => builder.append_null(),
        }
    }
    Arc::new(builder.finish())
}

fn srl_lists(results: &[LTPResult]) -> ArrayRef {
    let mut builder = ListBuilder::new(ListBuilder::new(StringBuilder::new()));
    for result in results {
        match &result.srl {
            Some(rows) => {
                let rows_builder = builder.values();
                for row in rows {
                    for tag in row {
                        rows_builder.values().append_value(tag);
                    }
                    rows_builder.append(true);
                }
                builder.append(true);
            }
            None => builder.append_null(),
        }
    }
    Arc::new(builder.finish())
}

fn dep_lists(results: &[LTPResult]) -> Result<ArrayRef, LTPError> {
    let mut builder = ListBuilder::new(StructBuilder::from_fields(dep_fields(), 0));
    for result in results {
        match &result.dep {
            Some(dependencies) => {
                let arcs = builder.values();
                for Dependency { arc, rel } in dependencies {
                    arcs.field_builder::<UInt64Builder>(0)
                        .ok_or_else(|| missing_field("arc"))?
                        .append_value(*arc as u64);
                    arcs.field_builder::<StringBuilder>(1)
                        .ok_or_else(|| missing_field("rel"))?
                        .append_value(rel);
                    arcs.append(true);
                }
                builder.append(true);
            }
            None => builder.append_null(),
        }
    }
    Ok(Arc::new(builder.finish()))
}

fn sdp_lists(results: &[LTPResult]) -> Result<ArrayRef, LTPError> {
    let mut builder = ListBuilder::new(StructBuilder::from_fields(sdp_fields(), 0));
    for result in results {
        match &result.sdp {
            Some(edges) => {
                let edges_builder = builder.values();
                for SemanticDependency { src, tgt, rel } in edges {
                    edges_builder
                        .field_builder::<UInt64Builder>(0)
                        .ok_or_else(|| missing_field("src"))?
                        .append_value(*src as u64);
                    edges_builder
                        .field_builder::<UInt64Builder>(1)
                        .ok_or_else(|| missing_field("tgt"))?
                        .append_value(*tgt as u64);
                    edges_builder
                        .field_builder::<StringBuilder>(2)
                        .ok_or_else(|| missing_field("rel"))?
                        .append_value(rel);
                    edges_builder.append(true);
                }
                builder.append(true);
            }
            None => builder.append_null(),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Converts row results into the six layer arrays, in schema order.
///
/// # Arguments
///
/// * `results` - pipeline results, one per sentence
///
/// # Returns
///
/// * `Vec<ArrayRef>` arrays `[seg, pos, ner, srl, dep, sdp]`, each of length `results.len()`
pub fn results_to_arrays(results: &[LTPResult]) -> Result<Vec<ArrayRef>, LTPError> {
    Ok(vec![
        string_lists(results, |result| result.seg.as_ref()),
        string_lists(results, |result| result.pos.as_ref()),
        string_lists(results, |result| result.ner.as_ref()),
        srl_lists(results),
        dep_lists(results)?,
        sdp_lists(results)?,
    ])
}

/// Assembles the six layer arrays into a record batch with columns
/// `["seg", "pos", "ner", "srl", "dep", "sdp"]`.
pub fn assemble_record_batch(arrays: Vec<ArrayRef>) -> Result<RecordBatch, LTPError> {
    if arrays.len() != Task::ALL.len() {
        return Err(LTPError::ValueError(format!(
            "expected {} layer arrays, got {}",
            Task::ALL.len(),
            arrays.len()
        )));
    }
    Ok(RecordBatch::try_new(ltp_result_schema(), arrays)?)
}

fn downcast<'a, T: 'static>(array: &'a dyn Array, what: &str) -> Result<&'a T, LTPError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| LTPError::ArrowError(format!("unexpected array type for {what}")))
}

fn column<'a>(batch: &'a RecordBatch, task: Task) -> Result<&'a ListArray, LTPError> {
    let column = batch
        .column_by_name(task.name())
        .ok_or_else(|| LTPError::ArrowError(format!("missing column `{task}`")))?;
    downcast::<ListArray>(column.as_ref(), task.name())
}

fn strings(array: &dyn Array, what: &str) -> Result<Vec<String>, LTPError> {
    let array = downcast::<StringArray>(array, what)?;
    Ok((0..array.len())
        .map(|index| array.value(index).to_string())
        .collect())
}

fn struct_column<'a, T: 'static>(
    array: &'a StructArray,
    name: &str,
) -> Result<&'a T, LTPError> {
    let column = array
        .column_by_name(name)
        .ok_or_else(|| LTPError::ArrowError(format!("missing struct field `{name}`")))?;
    downcast::<T>(column.as_ref(), name)
}

fn read_rows<T, F>(list: &ListArray, mut read: F) -> Result<Vec<Option<T>>, LTPError>
where
    F: FnMut(ArrayRef) -> Result<T, LTPError>,
{
    (0..list.len())
        .map(|row| {
            if list.is_null(row) {
                Ok(None)
            } else {
                read(list.value(row)).map(Some)
            }
        })
        .collect()
}

/// Reads row results back from a record batch with the `ltp_result_schema` layout.
pub fn results_from_record_batch(batch: &RecordBatch) -> Result<Vec<LTPResult>, LTPError> {
    let seg = read_rows(column(batch, Task::Seg)?, |row| strings(row.as_ref(), "seg"))?;
    let pos = read_rows(column(batch, Task::Pos)?, |row| strings(row.as_ref(), "pos"))?;
    let ner = read_rows(column(batch, Task::Ner)?, |row| strings(row.as_ref(), "ner"))?;
    let srl = read_rows(column(batch, Task::Srl)?, |row| {
        let rows = downcast::<ListArray>(row.as_ref(), "srl")?;
        (0..rows.len())
            .map(|index| strings(rows.value(index).as_ref(), "srl"))
            .collect::<Result<Vec<Vec<String>>, LTPError>>()
    })?;
    let dep = read_rows(column(batch, Task::Dep)?, |row| {
        let arcs = downcast::<StructArray>(row.as_ref(), "dep")?;
        let arc = struct_column::<UInt64Array>(arcs, "arc")?;
        let rel = struct_column::<StringArray>(arcs, "rel")?;
        Ok((0..arcs.len())
            .map(|index| Dependency {
                arc: arc.value(index) as usize,
                rel: rel.value(index).to_string(),
            })
            .collect::<Vec<Dependency>>())
    })?;
    let sdp = read_rows(column(batch, Task::Sdp)?, |row| {
        let edges = downcast::<StructArray>(row.as_ref(), "sdp")?;
        let src = struct_column::<UInt64Array>(edges, "src")?;
        let tgt = struct_column::<UInt64Array>(edges, "tgt")?;
        let rel = struct_column::<StringArray>(edges, "rel")?;
        Ok((0..edges.len())
            .map(|index| SemanticDependency {
                src: src.value(index) as usize,
                tgt: tgt.value(index) as usize,
                rel: rel.value(index).to_string(),
            })
            .collect::<Vec<SemanticDependency>>())
    })?;

    Ok(seg
        .into_iter()
        .zip(pos)
        .zip(ner)
        .zip(srl)
        .zip(dep)
        .zip(sdp)
        .map(|(((((seg, pos), ner), srl), dep), sdp)| LTPResult {
            seg,
            pos,
            ner,
            srl,
            dep,
            sdp,
        })
        .collect())
}

/// Converts a record batch into a plain mapping from column name to per-row JSON values.
/// Null entries become `Value::Null`.
pub fn record_batch_to_map(
    batch: &RecordBatch,
) -> Result<BTreeMap<String, Vec<serde_json::Value>>, LTPError> {
    let results = results_from_record_batch(batch)?;
    let mut columns: BTreeMap<String, Vec<serde_json::Value>> = Task::ALL
        .iter()
        .map(|task| (task.name().to_string(), Vec::with_capacity(results.len())))
        .collect();
    for result in &results {
        for task in Task::ALL {
            let value = match task {
                Task::Seg => serde_json::to_value(&result.seg)?,
                Task::Pos => serde_json::to_value(&result.pos)?,
                Task::Ner => serde_json::to_value(&result.ner)?,
                Task::Srl => serde_json::to_value(&result.srl)?,
                Task::Dep => serde_json::to_value(&result.dep)?,
                Task::Sdp => serde_json::to_value(&result.sdp)?,
            };
            if let Some(values) = columns.get_mut(task.name()) {
                values.push(value);
            }
        }
    }
    Ok(columns)
}

impl<B: ModelBackend> LTPModel<B> {
    /// Annotates a column of sentences.
    ///
    /// # Arguments
    ///
    /// * `sentences` - `StringArray` without nulls
    ///
    /// # Returns
    ///
    /// * `Vec<ArrayRef>` arrays `[seg, pos, ner, srl, dep, sdp]`, each of the input length
    pub fn pipeline_arrow(&mut self, sentences: ArrayRef) -> Result<Vec<ArrayRef>, LTPError> {
        let sentences = sentences
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| {
                LTPError::ValueError(format!(
                    "expected a Utf8 array of sentences, got {}",
                    sentences.data_type()
                ))
            })?;
        if sentences.null_count() > 0 {
            return Err(LTPError::ValueError(format!(
                "{} null sentences in the input array",
                sentences.null_count()
            )));
        }
        let input = (0..sentences.len())
            .map(|index| sentences.value(index))
            .collect::<Vec<&str>>();
        let results = self.predict(&input)?;
        results_to_arrays(&results)
    }

    /// Annotates a column of sentences into a record batch with `ltp_result_schema`.
    pub fn pipeline_record_batch(&mut self, sentences: ArrayRef) -> Result<RecordBatch, LTPError> {
        assemble_record_batch(self.pipeline_arrow(sentences)?)
    }
}
