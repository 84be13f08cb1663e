use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::error::{Error, Result};
use crate::timetable::Columns;
use crate::utils::models::Zone;

mod error;
mod filter;
mod ics;
mod info;
mod timetable;
mod utils;

#[derive(Parser)]
#[clap(version, about, long_about = None)]
struct Args {
    /// File with the four semester dates (DD/MM/YYYY) followed by the HTML timetable
    #[clap(value_parser)]
    input: PathBuf,

    /// Name of the exported iCalendar file (.ics)
    #[clap(short, long, value_name = "FILE NAME", default_value = "cal.ics")]
    output: String,

    /// Timezone the courses take place in
    #[clap(short = 'z', long, value_name = "TZID", default_value = "Asia/Bangkok")]
    timezone: String,

    /// Offset from UTC of the timezone, i.e.: +07:00
    #[clap(
        short,
        long,
        value_name = "OFFSET",
        default_value = "+07:00",
        allow_hyphen_values = true
    )]
    utc_offset: String,

    /// If the exported ICS file should not declare the timezone
    #[clap(short, long)]
    no_tz: bool,

    /// Ignore the courses of columns which aren't a weekday instead of failing
    #[clap(long)]
    skip_unmapped: bool,

    /// Remove repeated weekdays of a course
    #[clap(long)]
    dedup_days: bool,

    /// Choose which courses to export
    #[clap(short, long)]
    select: bool,

    /// Show the timetable instead of exporting it
    #[clap(short, long)]
    display: bool,

    /// Print debug logs
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let zone = Zone {
        name: args.timezone.clone(),
        offset: utils::parse_offset(&args.utc_offset)?,
    };

    let input = fs::read_to_string(&args.input).map_err(|source| Error::Input {
        path: args.input.clone(),
        source,
    })?;

    info!("Reading the semester dates...");
    let (semester, table) = info::info(&input)?;

    info!("Reading the timetable...");
    let columns = if args.skip_unmapped {
        Columns::Skip
    } else {
        Columns::Strict
    };
    let mut timetable = timetable::timetable(&table, columns)?;

    timetable = filter::timetable(timetable, args.select, args.dedup_days)?;

    if args.display {
        // Show the calendar
        println!("{}", timetable::display(&timetable));
        return Ok(());
    }

    // Export the calendar
    let events = timetable::build(&timetable, &semester, &zone)?;
    let calendar = ics::calendar(&events, &zone, !args.no_tz, chrono::Utc::now());

    let filename = ics::filename(&args.output);
    ics::export(&calendar, Path::new(&filename))?;

    println!(
        "{} events of {} courses exported => {filename}",
        events.len(),
        timetable.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "01/01/2024\n15/02/2024\n22/02/2024\n30/04/2024\n";

    fn entry(title: &str, id: &str, place: &str) -> String {
        format!(
            r#"<div class="text-truncate"><span>{title}</span><span>{id}</span><span>{place}</span></div>"#
        )
    }

    /// Hour column then monday to wednesday
    fn input(monday: &str, tuesday: &str, wednesday: &str) -> String {
        format!(
            r#"{HEADER}<div class="schedule">
  <div class="day-time-cell">09:00</div>
  <div class="day-time-cell">{monday}</div>
  <div class="day-time-cell">{tuesday}</div>
  <div class="day-time-cell">{wednesday}</div>
</div>
"#
        )
    }

    fn args(input: &Path, output: &Path) -> Args {
        Args::parse_from([
            "semcal",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
        ])
    }

    fn rrules(ics: &str) -> Vec<&str> {
        ics.lines()
            .filter_map(|line| line.strip_prefix("RRULE:"))
            .collect()
    }

    #[test]
    fn default_args() {
        let args = Args::parse_from(["semcal", "schedule.txt"]);

        assert_eq!(args.output, "cal.ics");
        assert_eq!(args.timezone, "Asia/Bangkok");
        assert_eq!(args.utc_offset, "+07:00");
        assert!(!args.no_tz && !args.skip_unmapped && !args.dedup_days);

        let args = Args::parse_from(["semcal", "schedule.txt", "-u", "-03:00"]);
        assert_eq!(args.utc_offset, "-03:00");
    }

    #[test]
    fn two_events_around_the_break() {
        let dir = tempfile::tempdir().unwrap();
        let intro = entry("Intro to Systems", "CS101", "Room 4, 0900-1030");
        let source = dir.path().join("schedule.txt");
        fs::write(&source, input(&intro, "", &intro)).unwrap();
        let output = dir.path().join("cal.ics");

        run(&args(&source, &output)).unwrap();

        let ics = fs::read_to_string(&output).unwrap();
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(
            rrules(&ics),
            [
                "FREQ=WEEKLY;WKST=SU;BYDAY=MO,WE;UNTIL=20240214T000000",
                "FREQ=WEEKLY;WKST=SU;BYDAY=MO,WE;UNTIL=20240430T000000",
            ]
        );
        assert!(ics.contains("DTSTART:20240101T090000\r\n"));
        assert!(ics.contains("DTEND:20240101T103000\r\n"));
        // First monday after the break
        assert!(ics.contains("DTSTART:20240226T090000\r\n"));
        assert!(ics.contains("DTEND:20240226T103000\r\n"));
        assert_eq!(ics.matches("SUMMARY:Intro to Systems\\, CS101").count(), 2);
        assert_eq!(ics.matches("LOCATION:Room 4").count(), 2);

        let uids = ics
            .lines()
            .filter(|line| line.starts_with("UID:"))
            .collect::<Vec<_>>();
        assert_eq!(uids.len(), 2);
        assert_ne!(uids[0], uids[1]);
    }

    #[test]
    fn extension_is_added() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("schedule.txt");
        fs::write(&source, input("", "", "")).unwrap();

        run(&args(&source, &dir.path().join("out"))).unwrap();

        assert!(dir.path().join("out.ics").exists());
    }

    #[test]
    fn no_file_on_malformed_cell() {
        let dir = tempfile::tempdir().unwrap();
        let broken = entry("Intro to Systems", "CS101", "Room 4, 0900-10");
        let source = dir.path().join("schedule.txt");
        fs::write(&source, input("", &broken, "")).unwrap();
        let output = dir.path().join("cal.ics");

        assert!(matches!(
            run(&args(&source, &output)),
            Err(Error::MalformedCell { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn no_file_on_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("schedule.txt");
        fs::write(&source, input("", "", "").replacen("15/02/2024", "15-02-2024", 1)).unwrap();
        let output = dir.path().join("cal.ics");

        assert!(matches!(
            run(&args(&source, &output)),
            Err(Error::InvalidDate { line: 2, .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("cal.ics");

        assert!(matches!(
            run(&args(&dir.path().join("nope.txt"), &output)),
            Err(Error::Input { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn display_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("schedule.txt");
        let intro = entry("Intro to Systems", "CS101", "Room 4, 0900-1030");
        fs::write(&source, input(&intro, "", "")).unwrap();
        let output = dir.path().join("cal.ics");

        let mut args = args(&source, &output);
        args.display = true;
        run(&args).unwrap();

        assert!(!output.exists());
    }
}
