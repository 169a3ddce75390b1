table! {
    chats (chat_id) {
        chat_id -> Int8,
        created_at -> Timestamptz,
    }
}
