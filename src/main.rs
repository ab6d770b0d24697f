use llm_perf::error::AppResult;

fn main() -> AppResult<()> {
    llm_perf::entry::run()
}
