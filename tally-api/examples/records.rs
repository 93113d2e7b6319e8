use tally_api::{ApiError, Client, Request};
use tally_auth::{Credentials, Settings};

#[tokio::main]
pub async fn main() -> Result<(), ApiError> {
    let settings = Settings::default();
    let client = Client::new(&settings)?;
    client
        .login(&Credentials::new("owner@example.com", "password"))
        .await?;

    let req = Request::sales_records().with_store(1).list().size(20);

    let _res = client.send(req).await?;
    Ok(())
}
