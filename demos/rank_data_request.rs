use chrono::NaiveDate;
use rankapi_rs::{GroupBy, RankClient, RankError, Source, Units};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("RANK API Example - rankDataRequest\n");

    // 1. Point the client at the local gateway and the beta service.
    let client = RankClient::builder()
        .host("localhost")
        .port(8194)
        .service(rankapi_rs::BETA_SERVICE)
        .build()?;
    println!("Connecting to {}:{}", client.host(), client.port());

    // 2. BCAP's activity in AAPL over Q1 2020, in shares.
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or("bad start date")?;
    let end = NaiveDate::from_ymd_opt(2020, 4, 1).ok_or("bad end date")?;
    let query = client
        .rank()
        .broker_acronym("BCAP")
        .between(start, end)
        .group_by(GroupBy::Broker)
        .ticker("AAPL US Equity")
        .source(Source::BrokerContributed)
        .units(Units::Shares);

    println!("Request: {}", serde_json::to_string_pretty(&query.build()?)?);

    // 3. Send it and print the rows.
    match query.fetch().await {
        Ok(report) => {
            println!("\n--- {} record(s) for {} ---", report.len(), report.correlation_id);
            for record in &report {
                println!("{record}\n");
            }
        }
        Err(RankError::Api { code, message }) => {
            println!("ERROR CODE: {code}\tERROR MESSAGE: {message}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
