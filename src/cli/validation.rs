use crate::cli::args::CliArgs;
use crate::output::OutputFormat;
use crate::runner::View;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    if args.init_config {
        return Ok(());
    }
    match args.view.as_deref().map(str::trim) {
        None | Some("") => {
            return Err(
                "missing view, expected one of: evacuees, deceased, helipads, posko".to_string(),
            )
        }
        Some(raw) => {
            View::parse(raw).ok_or_else(|| {
                format!("invalid view '{raw}', expected evacuees, deceased, helipads, or posko")
            })?;
        }
    }
    if args.page == Some(0) {
        return Err("invalid page, expected positive integer".to_string());
    }
    if let Some(raw) = args.output_format.as_deref() {
        OutputFormat::parse(raw)
            .ok_or_else(|| format!("invalid --output-format '{raw}', expected text, json, or html"))?;
    }
    if args.timeout == Some(0) {
        return Err("invalid timeout, expected positive integer".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(view: &str) -> CliArgs {
        CliArgs {
            view: Some(view.to_string()),
            ..CliArgs::default()
        }
    }

    #[test]
    fn accepts_known_views() {
        assert!(validate(&args("posko")).is_ok());
        assert!(validate(&args("pengungsi")).is_ok());
    }

    #[test]
    fn rejects_unknown_or_missing_view() {
        assert!(validate(&args("shelters")).unwrap_err().contains("invalid view"));
        assert!(validate(&CliArgs::default()).unwrap_err().contains("missing view"));
    }

    #[test]
    fn init_config_needs_no_view() {
        let a = CliArgs {
            init_config: true,
            ..CliArgs::default()
        };
        assert!(validate(&a).is_ok());
    }

    #[test]
    fn rejects_page_zero_and_unknown_format() {
        let mut a = args("evacuees");
        a.page = Some(0);
        assert!(validate(&a).unwrap_err().contains("invalid page"));
        a.page = Some(2);
        a.output_format = Some("xml".to_string());
        assert!(validate(&a).unwrap_err().contains("--output-format"));
    }
}
