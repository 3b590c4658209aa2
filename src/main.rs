fn main() {
    posture_companion_lib::run()
}
