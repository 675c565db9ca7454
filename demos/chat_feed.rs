// Example: a chat timeline that loads history at the top and follows new messages at the bottom.
use std::sync::{Arc, Mutex};

use virtulist::{ListOptions, ScrollContainer, ScrollMetrics, VirtualList};

/// Stand-in for a platform scroll view.
#[derive(Debug)]
struct ChatView {
    metrics: ScrollMetrics,
}

impl ScrollContainer for ChatView {
    fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    fn set_scroll_top(&mut self, offset: u64) {
        println!("  container <- scroll_top={offset}");
        self.metrics.scroll_top = offset;
    }
}

// Message heights vary with their text; the list only sees the resulting extents.
fn message_height(text_len: usize) -> u32 {
    24 + 18 * (text_len as u32 / 40)
}

fn main() {
    let messages: Arc<Mutex<Vec<usize>>> =
        Arc::new(Mutex::new((0..200).map(|i| (i * 37) % 160).collect()));

    let older_requests = Arc::new(Mutex::new(0usize));
    let requests = Arc::clone(&older_requests);
    let sizes = Arc::clone(&messages);
    let options = ListOptions::new(200, move |i| {
        let lens = sizes.lock().unwrap();
        message_height(lens[i])
    })
    .with_estimated_item_size(30)
    .with_viewport_height(480)
    .with_overscan_count(3)
    .with_reach_threshold(100)
    .with_initial_index(Some(199))
    .with_on_start_reached(Some(move |m: ScrollMetrics| {
        println!("  start reached at {}", m.scroll_top);
        *requests.lock().unwrap() += 1;
    }));

    let mut list = VirtualList::new(options);
    let mut view = ChatView {
        metrics: ScrollMetrics {
            client_height: 480,
            scroll_height: list.estimated_total_size(),
            scroll_top: 0,
        },
    };
    // Opening the conversation at the newest message.
    list.on_attach(&mut view);
    println!(
        "attached: offset={} anchor={:?} range={:?}",
        list.scroll_offset(),
        list.anchor_real_index(),
        list.mapper().to_real_range(list.range())
    );

    // The user drags towards the top of the loaded history.
    let mut now = 0;
    for top in [3_000u64, 1_500, 400, 60] {
        now += 16;
        view.metrics.scroll_top = top;
        list.on_scroll(view.metrics, now);
    }
    println!(
        "scrolled: offset={} anchor={:?} scrolling={} older_requests={}",
        list.scroll_offset(),
        list.anchor_real_index(),
        list.is_scrolling(),
        older_requests.lock().unwrap()
    );

    // 50 older messages arrive and are prepended.
    {
        let mut lens = messages.lock().unwrap();
        let older: Vec<usize> = (0..50).map(|i| (i * 53) % 200).collect();
        lens.splice(0..0, older);
    }
    let (count, origin) = (list.item_count() + 50, list.mapper().origin_index() + 50);
    list.set_length(count, origin);
    view.metrics.scroll_height = list.estimated_total_size();
    list.on_committed_update(&mut view);
    println!(
        "after prepend: offset={} anchor={:?}",
        list.scroll_offset(),
        list.anchor_real_index()
    );
    // The write-back echoes as a scroll event; it is recognized as our own.
    now += 16;
    list.on_scroll(view.metrics, now);

    // Scrolling stops.
    while !list.tick(now) {
        now += 10;
    }
    println!("idle at {now}ms");

    // A new message is sent; stick to the bottom.
    list.follow_output();
    messages.lock().unwrap().push(120);
    list.set_item_count(list.item_count() + 1);
    view.metrics.scroll_height = list.estimated_total_size();
    list.on_committed_update(&mut view);

    let mut rendered = Vec::new();
    list.collect_items(&mut rendered);
    println!(
        "after send: offset={} last_rendered={:?}",
        list.scroll_offset(),
        rendered.last()
    );
}
