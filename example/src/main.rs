fn main() {
    example::desktop_main()
}
