//! `set`: change one parameter on a matching menu entry.

use mikrosync_core::Controller;

use crate::cli::{GlobalOpts, SetArgs};
use crate::error::CliError;

/// Split `FIELD=VALUE` at the first `=`.
pub fn parse_selector(raw: &str) -> Result<(&str, &str), CliError> {
    match raw.split_once('=') {
        Some((field, value)) if !field.is_empty() => Ok((field, value)),
        _ => Err(CliError::Validation {
            field: "--where".into(),
            reason: format!("expected FIELD=VALUE, got '{raw}'"),
        }),
    }
}

pub async fn handle(
    controller: &Controller,
    args: &SetArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (field, value) = parse_selector(&args.selector)?;
    let changed = controller
        .set_value(&args.path, &args.param, &args.value, field, value)
        .await?;

    if !changed {
        return Err(CliError::NotFound {
            path: args.path.clone(),
            selector: args.selector.clone(),
        });
    }
    if !global.quiet {
        eprintln!("{} {}={} set", args.path, args.param, args.value);
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn selector_splits_at_first_equals() {
        let (field, value) = parse_selector("comment=a=b").unwrap();
        assert_eq!(field, "comment");
        assert_eq!(value, "a=b");
    }

    #[test]
    fn selector_allows_empty_value() {
        assert_eq!(parse_selector("comment=").unwrap(), ("comment", ""));
    }

    #[test]
    fn selector_rejects_missing_field() {
        assert!(matches!(parse_selector("=x"), Err(CliError::Validation { .. })));
        assert!(matches!(parse_selector("name"), Err(CliError::Validation { .. })));
    }
}
