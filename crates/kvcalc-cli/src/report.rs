//! Estimate collection and output rendering

use std::io::Write;

use kvcalc_core::{
    bytes_to_gib, calculate, CacheParams, Error, ModelDefinition, ModelRegistry, Precision,
};
use serde::Serialize;

use crate::error::Result;
use crate::OutputFormat;

/// One computed size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Estimate {
    pub model: String,
    pub variant: String,
    pub moe: bool,
    pub bytes: f64,
    pub gigabytes: f64,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub sequence_length: u64,
    pub batch_size: u64,
    pub precision: Precision,
    pub estimates: Vec<Estimate>,
}

/// Which part of the catalog to estimate
#[derive(Debug, Default, Clone, Copy)]
pub struct Selection<'a> {
    pub model: Option<&'a str>,
    pub variant: Option<&'a str>,
}

fn estimate_model(
    model: &ModelDefinition,
    variant: Option<&str>,
    params: &CacheParams,
) -> Result<Vec<Estimate>> {
    let make = |name: &str, moe: bool, bytes: f64| Estimate {
        model: model.name().to_string(),
        variant: name.to_string(),
        moe,
        bytes,
        gigabytes: bytes_to_gib(bytes),
    };

    if let Some(name) = variant {
        let found = model.variant(name).ok_or_else(|| Error::VariantNotFound {
            model: model.name().to_string(),
            variant: name.to_string(),
        })?;
        return Ok(vec![make(name, found.is_moe(), calculate(found, params)?)]);
    }

    model
        .variants()
        .iter()
        .map(|v| -> Result<Estimate> { Ok(make(&v.name, v.is_moe(), calculate(v, params)?)) })
        .collect()
}

/// Compute estimates for the selected models, in registry order.
pub fn build_report(
    registry: &ModelRegistry,
    params: &CacheParams,
    selection: Selection<'_>,
) -> Result<Report> {
    let precision = params.validate()?;

    let models: Vec<&ModelDefinition> = match selection.model {
        Some(name) => vec![registry
            .get(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))?],
        None => registry.list().collect(),
    };

    let mut estimates = Vec::new();
    for model in models {
        estimates.extend(estimate_model(model, selection.variant, params)?);
    }

    Ok(Report {
        sequence_length: params.sequence_length,
        batch_size: params.batch_size,
        precision,
        estimates,
    })
}

pub fn write_report(out: &mut impl Write, report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            writeln!(out, "KV Cache Size Estimator")?;
            writeln!(out, "=======================")?;
            writeln!(out, "Sequence Length: {}", report.sequence_length)?;
            writeln!(out, "Batch Size: {}", report.batch_size)?;
            writeln!(out, "Precision: {}", report.precision)?;
            writeln!(out)?;
            for estimate in &report.estimates {
                writeln!(
                    out,
                    "{} {}: {:.2} GB",
                    estimate.model, estimate.variant, estimate.gigabytes
                )?;
            }
        }
    }
    Ok(())
}

pub fn write_catalog(
    out: &mut impl Write,
    registry: &ModelRegistry,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let models: Vec<&ModelDefinition> = registry.list().collect();
            serde_json::to_writer_pretty(&mut *out, &models)?;
            writeln!(out)?;
        }
        OutputFormat::Table => {
            for model in registry.list() {
                writeln!(out, "{} - {}", model.name(), model.description())?;
                for v in model.variants() {
                    write!(
                        out,
                        "  {}: layers={} hidden={} heads={}",
                        v.name, v.num_layers, v.hidden_size, v.num_attention_heads
                    )?;
                    if let (Some(experts), Some(capacity)) = (v.num_experts, v.expert_capacity) {
                        write!(
                            out,
                            " experts={} capacity={} active={}",
                            experts, capacity, v.active_experts()
                        )?;
                    }
                    writeln!(out)?;
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use kvcalc_core::CatalogConfig;

    fn registry() -> ModelRegistry {
        CatalogConfig::builtin().unwrap().into_registry().unwrap()
    }

    fn render(report: &Report, format: OutputFormat) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, report, format).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_report_covers_every_variant() {
        let registry = registry();
        let report =
            build_report(&registry, &CacheParams::default(), Selection::default()).unwrap();

        let expected: usize = registry.list().map(|m| m.variants().len()).sum();
        assert_eq!(report.estimates.len(), expected);
        assert_eq!(report.estimates[0].model, "GPT-3");
        assert_eq!(report.estimates[0].variant, "175B");
    }

    #[test]
    fn test_table_output() {
        let registry = registry();
        let params = CacheParams::default();
        let selection = Selection {
            model: Some("LLaMA"),
            variant: Some("7B"),
        };
        let report = build_report(&registry, &params, selection).unwrap();
        let text = render(&report, OutputFormat::Table);

        assert!(text.starts_with("KV Cache Size Estimator\n"));
        assert!(text.contains("Sequence Length: 2048\n"));
        assert!(text.contains("Precision: float16\n"));
        assert!(text.ends_with("LLaMA 7B: 32.00 GB\n"));
    }

    #[test]
    fn test_moe_row_is_flagged() {
        let registry = registry();
        let selection = Selection {
            model: Some("Mixtral"),
            variant: Some("8x7B"),
        };
        let report = build_report(&registry, &CacheParams::default(), selection).unwrap();
        assert!(report.estimates[0].moe);
        assert_eq!(report.estimates[0].gigabytes, 64.0);
    }

    #[test]
    fn test_json_output_parses() {
        let registry = registry();
        let selection = Selection {
            model: Some("GPT-3"),
            variant: None,
        };
        let report = build_report(&registry, &CacheParams::default(), selection).unwrap();
        let text = render(&report, OutputFormat::Json);

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["precision"], "float16");
        assert_eq!(value["estimates"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_model_and_variant() {
        let registry = registry();
        let params = CacheParams::default();

        let err = build_report(
            &registry,
            &params,
            Selection {
                model: Some("GPT-5"),
                variant: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, CliError::Core(Error::ModelNotFound(_))));

        let err = build_report(
            &registry,
            &params,
            Selection {
                model: Some("GPT-3"),
                variant: Some("1T"),
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CliError::Core(Error::VariantNotFound { ref model, ref variant })
                if model == "GPT-3" && variant == "1T"
        ));
    }

    #[test]
    fn test_invalid_params_fail_before_estimating() {
        let registry = registry();
        let params = CacheParams::default().with_batch_size(0);
        let err = build_report(&registry, &params, Selection::default()).unwrap_err();
        assert!(matches!(err, CliError::Core(Error::InvalidParameter(_))));
    }

    #[test]
    fn test_catalog_listing() {
        let registry = registry();
        let mut buf = Vec::new();
        write_catalog(&mut buf, &registry, OutputFormat::Table).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("GPT-3 - OpenAI's GPT-3 model\n"));
        assert!(text.contains("  175B: layers=96 hidden=12288 heads=96\n"));
        assert!(text.contains("  8x7B: layers=32 hidden=4096 heads=32 experts=8 capacity=32 active=2\n"));
    }
}
