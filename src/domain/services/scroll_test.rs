use super::Scroll;

fn scroll(list_length: u16, viewport_length: u16) -> Scroll {
    let mut scroll = Scroll::default();
    scroll.set_state(list_length, viewport_length);
    return scroll;
}

#[test]
fn it_stays_at_top_when_content_fits() {
    let mut scroll = scroll(5, 20);
    scroll.down();
    scroll.down_page();
    scroll.last();
    assert_eq!(scroll.position, 0);
}

#[test]
fn it_scrolls_to_last() {
    let mut scroll = scroll(50, 20);
    scroll.last();
    assert_eq!(scroll.position, 30);

    scroll.down();
    assert_eq!(scroll.position, 30);
}

#[test]
fn it_pages() {
    let mut scroll = scroll(50, 20);
    scroll.down_page();
    assert_eq!(scroll.position, 10);
    scroll.down_page();
    scroll.down_page();
    assert_eq!(scroll.position, 30);
    scroll.up_page();
    assert_eq!(scroll.position, 20);
    scroll.up();
    assert_eq!(scroll.position, 19);
}

#[test]
fn it_clamps_when_content_shrinks() {
    let mut scroll = scroll(50, 20);
    scroll.last();
    scroll.set_state(25, 20);
    assert_eq!(scroll.position, 5);
}
