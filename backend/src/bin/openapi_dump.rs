//! Print the OpenAPI document as JSON.

use backend::doc::ApiDoc;
use utoipa::OpenApi;

fn main() -> color_eyre::Result<()> {
    println!("{}", ApiDoc::openapi().to_json()?);
    Ok(())
}
