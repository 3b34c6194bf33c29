use micro_mime::field::Fields;
use micro_mime::multipart::MultipartBody;
use micro_mime::part::BodyPart;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::TRACE).with_writer(std::io::stderr).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let profile = json!({
        "name": "micro",
        "tags": ["mime", "multipart"],
        "address": { "city": "Hangzhou" }
    });
    let fields = match Fields::try_from(profile) {
        Ok(fields) => fields,
        Err(e) => {
            error!(cause = %e, "invalid form fields");
            return;
        }
    };

    let fields = fields.with("notes", BodyPart::text("déjà vu").with_filename("notes.txt"));
    let fields = match std::env::args().nth(1) {
        Some(path) => match BodyPart::from_path(&path) {
            Ok(part) => fields.with("upload", part),
            Err(e) => {
                error!(cause = %e, "skip upload");
                fields
            }
        },
        None => fields,
    };

    let body = match MultipartBody::form_data(fields) {
        Ok(body) => body,
        Err(e) => {
            error!(cause = %e, "build form-data body failed");
            return;
        }
    };
    info!(content_type = ?body.content_type(), parts = body.parts().len(), "form-data body ready");

    let mut stdout = tokio::io::stdout();
    for chunk in body.stream() {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(e) => {
                error!(cause = %e, "serialize body failed");
                return;
            }
        };
        if let Err(e) = stdout.write_all(&chunk).await {
            error!(cause = %e, "write stdout failed");
            return;
        }
    }
    let _ = stdout.flush().await;
}
