fn main() {
    uniffi::generate_scaffolding("src/health.udl").expect("failed to generate UniFFI scaffolding");
}
