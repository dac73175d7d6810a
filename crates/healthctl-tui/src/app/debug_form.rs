//! Cascading namespace → pod → container → level picker

use ratatui::widgets::ListState;

use healthctl_types::DebugLevel;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebugStep {
    Namespace,
    Pod,
    Container,
    Level,
}

impl DebugStep {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Namespace => " Namespace ",
            Self::Pod => " Pod ",
            Self::Container => " Container ",
            Self::Level => " Debug Level ",
        }
    }
}

/// What the caller has to do after a selection
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormEvent {
    LoadPods(String),
    LoadContainers {
        namespace: String,
        pod: String,
    },
    Submit {
        namespace: String,
        pod: String,
        container: String,
        level: DebugLevel,
    },
}

pub struct DebugFormState {
    pub step: DebugStep,
    pub namespaces: Vec<String>,
    pub pods: Vec<String>,
    pub containers: Vec<String>,
    pub namespace: Option<String>,
    pub pod: Option<String>,
    pub container: Option<String>,
    pub list_state: ListState,
    /// Waiting for pods or containers to load
    pub loading: bool,
}

impl DebugFormState {
    pub fn new(namespaces: Vec<String>) -> Self {
        Self {
            step: DebugStep::Namespace,
            namespaces,
            pods: Vec::new(),
            containers: Vec::new(),
            namespace: None,
            pod: None,
            container: None,
            list_state: ListState::default().with_selected(Some(0)),
            loading: false,
        }
    }

    /// Choices for the current step
    pub fn options(&self) -> Vec<String> {
        match self.step {
            DebugStep::Namespace => self.namespaces.clone(),
            DebugStep::Pod => self.pods.clone(),
            DebugStep::Container => self.containers.clone(),
            DebugStep::Level => DebugLevel::ALL
                .iter()
                .map(|l| l.as_str().to_string())
                .collect(),
        }
    }

    fn option_count(&self) -> usize {
        match self.step {
            DebugStep::Namespace => self.namespaces.len(),
            DebugStep::Pod => self.pods.len(),
            DebugStep::Container => self.containers.len(),
            DebugStep::Level => DebugLevel::ALL.len(),
        }
    }

    pub fn up(&mut self) {
        let len = self.option_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn down(&mut self) {
        let len = self.option_count();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Accept the highlighted choice
    pub fn select(&mut self) -> Option<FormEvent> {
        if self.loading {
            return None;
        }
        let index = self.list_state.selected()?;

        match self.step {
            DebugStep::Namespace => {
                let namespace = self.namespaces.get(index)?.clone();
                self.namespace = Some(namespace.clone());
                self.loading = true;
                Some(FormEvent::LoadPods(namespace))
            }
            DebugStep::Pod => {
                let pod = self.pods.get(index)?.clone();
                self.pod = Some(pod.clone());
                self.loading = true;
                Some(FormEvent::LoadContainers {
                    namespace: self.namespace.clone()?,
                    pod,
                })
            }
            DebugStep::Container => {
                self.container = Some(self.containers.get(index)?.clone());
                self.enter(DebugStep::Level);
                None
            }
            DebugStep::Level => Some(FormEvent::Submit {
                namespace: self.namespace.clone()?,
                pod: self.pod.clone()?,
                container: self.container.clone()?,
                level: *DebugLevel::ALL.get(index)?,
            }),
        }
    }

    pub fn set_pods(&mut self, pods: Vec<String>) {
        self.pods = pods;
        self.enter(DebugStep::Pod);
    }

    pub fn set_containers(&mut self, containers: Vec<String>) {
        self.containers = containers;
        self.enter(DebugStep::Container);
    }

    /// A load failed; stay on the current step
    pub fn load_failed(&mut self) {
        self.loading = false;
    }

    /// Step back, returning false when already at the first step
    pub fn back(&mut self) -> bool {
        self.loading = false;
        match self.step {
            DebugStep::Namespace => false,
            DebugStep::Pod => {
                self.pod = None;
                self.enter(DebugStep::Namespace);
                true
            }
            DebugStep::Container => {
                self.container = None;
                self.enter(DebugStep::Pod);
                true
            }
            DebugStep::Level => {
                self.enter(DebugStep::Container);
                true
            }
        }
    }

    fn enter(&mut self, step: DebugStep) {
        self.step = step;
        self.loading = false;
        self.list_state.select(Some(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_full_cascade() {
        let mut form = DebugFormState::new(names(&["default", "fed-smf"]));
        form.down();
        assert_eq!(form.select(), Some(FormEvent::LoadPods("fed-smf".to_string())));
        assert!(form.loading);
        // Selections are ignored while loading
        assert_eq!(form.select(), None);

        form.set_pods(names(&["smf-0", "smf-1"]));
        assert_eq!(form.step, DebugStep::Pod);
        form.down();
        assert_eq!(
            form.select(),
            Some(FormEvent::LoadContainers {
                namespace: "fed-smf".to_string(),
                pod: "smf-1".to_string()
            })
        );

        form.set_containers(names(&["smf-app", "istio-proxy"]));
        assert_eq!(form.select(), None);
        assert_eq!(form.step, DebugStep::Level);
        assert_eq!(form.options(), names(&["DEBUG_1", "DEBUG_2", "DEBUG_3"]));

        form.up();
        assert_eq!(
            form.select(),
            Some(FormEvent::Submit {
                namespace: "fed-smf".to_string(),
                pod: "smf-1".to_string(),
                container: "smf-app".to_string(),
                level: DebugLevel::Debug3,
            })
        );
    }

    #[test]
    fn test_back_unwinds_steps() {
        let mut form = DebugFormState::new(names(&["fed-upf"]));
        form.select();
        form.set_pods(names(&["upf-0"]));
        form.select();
        form.set_containers(names(&["upf"]));
        form.select();
        assert_eq!(form.step, DebugStep::Level);

        assert!(form.back());
        assert_eq!(form.step, DebugStep::Container);
        assert!(form.back());
        assert_eq!(form.step, DebugStep::Pod);
        assert_eq!(form.container, None);
        assert!(form.back());
        assert_eq!(form.step, DebugStep::Namespace);
        assert!(!form.back());
    }

    #[test]
    fn test_empty_step_selects_nothing() {
        let mut form = DebugFormState::new(names(&["empty-ns"]));
        form.select();
        form.set_pods(Vec::new());
        form.down();
        assert_eq!(form.select(), None);
    }

    #[test]
    fn test_load_failure_stays_on_step() {
        let mut form = DebugFormState::new(names(&["fed-smf"]));
        form.select();
        form.load_failed();
        assert_eq!(form.step, DebugStep::Namespace);
        assert!(!form.loading);
    }
}
