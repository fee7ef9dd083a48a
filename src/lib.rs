pub mod modules{
    pub mod error;
    pub mod entry;
    pub mod system_init;
    pub mod simulation;
    pub mod trace_audit;

    pub mod state_object{
        pub mod shared_state;
        pub mod shared_region;
        pub mod critical_section;
    }

    pub mod semaphore_functions{
        pub mod semaphore;
        pub mod semaphore_set;
        pub mod relay_gate;
    }

    pub mod logger_functions{
        pub mod state_logger;
        pub mod journal;
    }

    pub mod transport_functions{
        pub mod transport;
    }

    pub mod actor_functions{
        pub mod pacing;
        pub mod client;
        pub mod waiter;
        pub mod chef;
    }
}
