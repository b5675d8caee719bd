use std::error::Error;

use rep_scorecard::apps::run_scorecard;

fn main() -> Result<(), Box<dyn Error>> {
    run_scorecard(std::env::args().skip(1))
}
