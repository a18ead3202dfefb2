#[actix_web::main]
async fn main() {
    if let Err(e) = rfpmatch_lib::run().await {
        eprintln!("rfpmatch: {}", e);
        std::process::exit(1);
    }
}
