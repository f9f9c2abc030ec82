use super::Announcement;

/// Observer of archetype announcements.
pub trait AnnouncementHandler {
    fn handle_announcement(&mut self, announcement: &Announcement);

    fn handle_announcements(&mut self, announcements: &[Announcement]) {
        for announcement in announcements {
            self.handle_announcement(announcement);
        }
    }
}

impl<F> AnnouncementHandler for F
where
    F: FnMut(&Announcement),
{
    fn handle_announcement(&mut self, announcement: &Announcement) {
        self(announcement)
    }
}
