use anyhow::{Context, Result};
use log::{error, info};

use crate::{
    cli::{ReshapeArgs, split_column_list},
    io_utils::{self, OutputFormat},
    reshape::{LogObserver, reshape_with_observer},
    schema::ParcelSchema,
    table,
};

pub fn execute(args: &ReshapeArgs) -> Result<()> {
    let delimiter = args.delimiter.unwrap_or(io_utils::DEFAULT_INPUT_DELIMITER);
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let format = OutputFormat {
        delimiter: args
            .output_delimiter
            .unwrap_or(io_utils::DEFAULT_OUTPUT_DELIMITER),
        decimal: args.decimal_separator,
    };
    let schema = ParcelSchema::load_or_default(args.schema.as_deref())?;
    let fixed_columns = split_column_list(&args.fixed_columns);

    info!(
        "Reshaping '{}' (delimiter '{}') with {} fixed column(s)",
        args.input.display(),
        crate::printable_delimiter(delimiter),
        fixed_columns.len()
    );
    let input = io_utils::read_table_from_path(&args.input, delimiter, encoding)?;
    info!(
        "Read {} row(s) across {} column(s)",
        input.row_count(),
        input.headers().len()
    );

    let report = reshape_with_observer(&input, &fixed_columns, &schema, &mut LogObserver);
    if report.coercion_failures > 0 {
        info!(
            "{} numeric value(s) could not be parsed and were left empty",
            report.coercion_failures
        );
    }

    let Some(table) = report.outcome.table() else {
        error!("No meaningful output possible: no parcel groups or fixed columns found");
        return Ok(());
    };

    if args.preview {
        table::print_output(table, args.rows, format.decimal);
        return Ok(());
    }

    let writer = io_utils::open_writer(args.output.as_deref())?;
    io_utils::write_table(writer, table, format).with_context(|| {
        format!(
            "Writing reshaped table to {}",
            describe_destination(args.output.as_deref())
        )
    })?;
    info!(
        "Wrote {} row(s) x {} column(s) to {}",
        table.row_count(),
        table.columns().len(),
        describe_destination(args.output.as_deref())
    );
    Ok(())
}

fn describe_destination(path: Option<&std::path::Path>) -> String {
    path.filter(|p| !io_utils::is_dash(p))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "stdout".to_string())
}
