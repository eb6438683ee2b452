use crate::cli::InspectArgs;
use crate::diff::{expand_diff, segment_diff};

pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(&args.patch)?;

    let json = if args.segments {
        serde_json::to_string_pretty(&segment_diff(&text))?
    } else {
        serde_json::to_string_pretty(&expand_diff(&text))?
    };
    println!("{}", json);
    Ok(())
}
